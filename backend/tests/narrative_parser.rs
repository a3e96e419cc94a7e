use coachlog_backend::services::narrative::{
    parse, Section, BARRIERS_BEHAVIORS, INTERVENTIONS, PROGRESS_GOALS, TASKS_PRODUCTIVITY,
};

#[test]
fn round_trip_emphasised_headers() {
    let note = "**Tasks & Productivity:**\nDid X.\n**Interventions:**\nDid Y.";
    assert_eq!(
        parse(note),
        vec![
            Section {
                header: TASKS_PRODUCTIVITY.to_string(),
                content: "Did X.".to_string()
            },
            Section {
                header: INTERVENTIONS.to_string(),
                content: "Did Y.".to_string()
            },
        ]
    );
}

#[test]
fn plain_headers_yield_the_same_sections() {
    let emphasised = "**Tasks & Productivity:**\nDid X.\n**Interventions:**\nDid Y.";
    let plain = "Tasks & Productivity:\nDid X.\nInterventions:\nDid Y.";
    assert_eq!(parse(plain), parse(emphasised));
}

#[test]
fn all_four_sections_in_arbitrary_order() {
    let note = "**Progress on Goals:** Ahead of plan.\n\
                **Barriers & Behaviors:** None.\n\
                **Tasks & Productivity:** Bagging groceries.\n\
                **Interventions:** Modeling pace.";
    let sections = parse(note);
    let headers: Vec<&str> = sections.iter().map(|s| s.header.as_str()).collect();
    assert_eq!(
        headers,
        vec![
            PROGRESS_GOALS,
            BARRIERS_BEHAVIORS,
            TASKS_PRODUCTIVITY,
            INTERVENTIONS
        ]
    );
}

#[test]
fn missing_sections_and_headerless_text_are_tolerated() {
    let note = "Client seemed tired today.\nInterventions: Extra breaks.";
    let sections = parse(note);
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].header, "");
    assert_eq!(sections[0].content, "Client seemed tired today.");
    assert_eq!(sections[1].header, INTERVENTIONS);
    assert_eq!(sections[1].content, "Extra breaks.");
}

#[test]
fn content_is_never_dropped_and_blanks_never_emitted() {
    let note = "**Tasks & Productivity:**\n\n**Barriers & Behaviors:**\nShouted once.\n\n";
    let sections = parse(note);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].header, BARRIERS_BEHAVIORS);
    assert_eq!(sections[0].content, "Shouted once.");
    assert!(sections.iter().all(|s| !s.content.trim().is_empty()));
}

#[test]
fn optional_connectives_are_accepted() {
    for variant in [
        "Tasks & Productivity: worked",
        "Tasks and Productivity: worked",
        "Tasks Productivity: worked",
    ] {
        let sections = parse(variant);
        assert_eq!(sections.len(), 1, "variant {:?}", variant);
        assert_eq!(sections[0].header, TASKS_PRODUCTIVITY);
        assert_eq!(sections[0].content, "worked");
    }
}
