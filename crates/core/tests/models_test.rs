use chrono::Weekday;
use pretty_assertions::assert_eq;
use rollcall_core::errors::RollcallError;
use rollcall_core::models::{Attendance, FixedTrainingTime, ReactionSymbol, TemplateFile};
use rstest::rstest;

const TEMPLATES: &str = r#"{
    "fixedTrainingTimes": [
        {
            "weekDay": 1,
            "startTimeHours": 18,
            "startTimeMinutes": 0,
            "endTimeHours": 19,
            "endTimeMinutes": 30,
            "name": "Training",
            "description": "Bring water",
            "location": "Hall 2"
        },
        {
            "weekDay": 0,
            "startTimeHours": 10,
            "startTimeMinutes": 15,
            "endTimeHours": 12,
            "endTimeMinutes": 0,
            "name": "Sunday Run"
        }
    ]
}"#;

#[test]
fn test_template_file_parsing() {
    let file = TemplateFile::from_json(TEMPLATES).expect("valid template file");

    assert_eq!(file.fixed_training_times.len(), 2);
    let training = &file.fixed_training_times[0];
    assert_eq!(training.weekday(), Some(Weekday::Mon));
    assert_eq!(training.end_time_minutes, 30);
    assert_eq!(training.location, "Hall 2");

    let run = &file.fixed_training_times[1];
    assert_eq!(run.weekday(), Some(Weekday::Sun));
    assert_eq!(run.description, "");
    assert_eq!(run.location, "");
}

#[test]
fn test_missing_list_is_empty() {
    let file = TemplateFile::from_json("{}").unwrap();
    assert!(file.fixed_training_times.is_empty());
}

#[test]
fn test_malformed_json_is_a_validation_error() {
    let result = TemplateFile::from_json("{\"fixedTrainingTimes\": [{\"weekDay\": 1}]}");
    assert!(matches!(result, Err(RollcallError::Validation(_))));
}

fn template() -> FixedTrainingTime {
    FixedTrainingTime {
        week_day: 3,
        start_time_hours: 18,
        start_time_minutes: 0,
        end_time_hours: 19,
        end_time_minutes: 0,
        name: "Training".to_string(),
        description: String::new(),
        location: String::new(),
    }
}

#[rstest]
#[case::weekday_out_of_range(FixedTrainingTime { week_day: 7, ..template() })]
#[case::hour_out_of_range(FixedTrainingTime { start_time_hours: 24, ..template() })]
#[case::minute_out_of_range(FixedTrainingTime { end_time_minutes: 60, ..template() })]
#[case::end_before_start(FixedTrainingTime { end_time_hours: 17, ..template() })]
#[case::zero_length(FixedTrainingTime { end_time_hours: 18, ..template() })]
#[case::blank_name(FixedTrainingTime { name: "  ".to_string(), ..template() })]
fn test_invalid_templates_are_rejected(#[case] invalid: FixedTrainingTime) {
    assert!(matches!(invalid.validate(), Err(RollcallError::Validation(_))));
}

#[test]
fn test_one_invalid_template_rejects_the_file() {
    let json = TEMPLATES.replace("\"weekDay\": 0", "\"weekDay\": 9");
    assert!(TemplateFile::from_json(&json).is_err());
}

#[rstest]
#[case("yes", Attendance::Yes)]
#[case("no", Attendance::No)]
#[case("maybe", Attendance::Maybe)]
fn test_attendance_from_str(#[case] raw: &str, #[case] expected: Attendance) {
    assert_eq!(raw.parse::<Attendance>().unwrap(), expected);
    assert_eq!(expected.to_string(), raw);
}

#[test]
fn test_unknown_attendance_is_rejected() {
    assert!("Yes".parse::<Attendance>().is_err());
    assert!("".parse::<Attendance>().is_err());
}

#[test]
fn test_attendance_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Attendance::Maybe).unwrap(), "\"maybe\"");
}

#[rstest]
#[case("✅", ReactionSymbol::Yes)]
#[case("👍", ReactionSymbol::Yes)]
#[case("❌", ReactionSymbol::No)]
#[case("👎", ReactionSymbol::No)]
#[case("❓", ReactionSymbol::Maybe)]
#[case("🤷", ReactionSymbol::Maybe)]
#[case("🎉", ReactionSymbol::Unrecognized)]
#[case("yes", ReactionSymbol::Unrecognized)]
fn test_reaction_symbol_parse(#[case] raw: &str, #[case] expected: ReactionSymbol) {
    assert_eq!(ReactionSymbol::parse(raw), expected);
}

#[test]
fn test_affordance_glyphs_map_back_to_their_answer() {
    for yes_no in Attendance::ALL {
        assert_eq!(ReactionSymbol::parse(yes_no.symbol()).attendance(), Some(yes_no));
    }
    assert_eq!(ReactionSymbol::Unrecognized.attendance(), None);
}
