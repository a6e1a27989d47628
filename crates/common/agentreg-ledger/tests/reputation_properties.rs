use agentreg_ledger::{Principal, RegistryError, ReputationService, ReputationSummary};
use assert_matches::assert_matches;

fn p(s: &str) -> Principal {
    Principal::new(s)
}

fn rater(i: usize) -> Principal {
    Principal::new(format!("did:key:z6Mkrater{}", i))
}

fn register(svc: &ReputationService, owner: &str) -> u64 {
    svc.register_agent(p(owner), format!("ipfs://{}", owner), &p("0xdeployer"))
        .expect("registration should succeed")
}

#[test]
fn identifiers_are_dense_and_total_tracks_registrations() {
    let svc = ReputationService::in_memory();
    assert_eq!(svc.get_total_agents().unwrap(), 0);

    for expected in 0..10u64 {
        assert_eq!(register(&svc, &format!("0xowner{}", expected)), expected);
        assert_eq!(svc.get_total_agents().unwrap(), expected + 1);
    }

    // Rejected registrations do not consume an identifier.
    assert_matches!(
        svc.register_agent(Principal::null(), String::new(), &p("0xdeployer")),
        Err(RegistryError::InvalidOwner)
    );
    assert_eq!(svc.get_total_agents().unwrap(), 10);
    assert_eq!(register(&svc, "0xlate"), 10);
}

#[test]
fn counters_match_accepted_ratings() {
    let svc = ReputationService::in_memory();
    let id = register(&svc, "0xowner");
    let values = [5u8, 1, 3, 3, 4, 2, 5];

    for (i, value) in values.iter().enumerate() {
        svc.submit_rating(id, i64::from(*value), &rater(i)).unwrap();
    }

    let record = svc.get_agent(id).unwrap();
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    assert_eq!(record.total_ratings, values.len() as u64);
    assert_eq!(record.total_score, sum);
    assert_eq!(
        svc.get_average_rating(id).unwrap(),
        sum * 100 / values.len() as u64
    );
}

#[test]
fn duplicate_rating_leaves_counters_unchanged() {
    let svc = ReputationService::in_memory();
    let id = register(&svc, "0xowner");
    svc.submit_rating(id, 4, &rater(1)).unwrap();

    for value in 1..=5 {
        let err = svc.submit_rating(id, value, &rater(1)).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRated(id, rater(1)));
    }
    assert_eq!(
        svc.get_reputation_summary(id).unwrap(),
        ReputationSummary { total_ratings: 1, average_score: 400 }
    );
}

#[test]
fn self_rating_always_rejected() {
    let svc = ReputationService::in_memory();
    let id = register(&svc, "0xowner");
    for value in 1..=5 {
        assert_matches!(
            svc.submit_rating(id, value, &p("0xowner")),
            Err(RegistryError::CannotRateOwnAgent(i)) if i == id
        );
    }
    assert!(!svc.has_address_rated(id, &p("0xowner")).unwrap());
    assert_eq!(svc.get_reputation_summary(id).unwrap().total_ratings, 0);
}

#[test]
fn rating_range_is_closed_one_to_five() {
    let svc = ReputationService::in_memory();
    let id = register(&svc, "0xowner");

    assert_matches!(svc.submit_rating(id, 0, &rater(0)), Err(RegistryError::InvalidRating(0)));
    assert_matches!(svc.submit_rating(id, 6, &rater(0)), Err(RegistryError::InvalidRating(6)));
    assert_matches!(svc.submit_rating(id, 255, &rater(0)), Err(RegistryError::InvalidRating(255)));
    assert!(!svc.has_address_rated(id, &rater(0)).unwrap());

    for value in 1..=5u8 {
        svc.submit_rating(id, i64::from(value), &rater(value as usize)).unwrap();
    }
    assert_eq!(svc.get_reputation_summary(id).unwrap().total_ratings, 5);
}

#[test]
fn scenario_five_four_three_averages_four() {
    let svc = ReputationService::in_memory();
    let a = register(&svc, "0xo1");
    svc.submit_rating(a, 5, &p("0xr1")).unwrap();
    svc.submit_rating(a, 4, &p("0xr2")).unwrap();
    svc.submit_rating(a, 3, &p("0xr3")).unwrap();
    assert_eq!(
        svc.get_reputation_summary(a).unwrap(),
        ReputationSummary { total_ratings: 3, average_score: 400 }
    );
}

#[test]
fn scenario_five_four_four_truncates() {
    let svc = ReputationService::in_memory();
    let a = register(&svc, "0xo1");
    svc.submit_rating(a, 5, &p("0xr1")).unwrap();
    svc.submit_rating(a, 4, &p("0xr2")).unwrap();
    let last = svc.submit_rating(a, 4, &p("0xr3")).unwrap();
    assert_eq!(last.new_average, 433);
    assert_eq!(svc.get_average_rating(a).unwrap(), 433);
}

#[test]
fn unknown_agent_is_not_found() {
    let svc = ReputationService::in_memory();
    register(&svc, "0xo1");
    assert_matches!(svc.submit_rating(999, 3, &rater(0)), Err(RegistryError::AgentNotFound(999)));
    assert_matches!(svc.get_agent_details(999), Err(RegistryError::AgentNotFound(999)));
    assert_matches!(svc.get_reputation_summary(999), Err(RegistryError::AgentNotFound(999)));
    assert_matches!(svc.get_average_rating(999), Err(RegistryError::AgentNotFound(999)));
    // Query helper conflates "no such agent" with "not rated".
    assert!(!svc.has_address_rated(999, &rater(0)).unwrap());
}

#[test]
fn agents_do_not_share_reputation() {
    let svc = ReputationService::in_memory();
    let a = register(&svc, "0xo1");
    let b = register(&svc, "0xo2");

    svc.submit_rating(a, 5, &rater(1)).unwrap();
    svc.submit_rating(a, 5, &rater(2)).unwrap();
    svc.submit_rating(b, 1, &rater(1)).unwrap();

    assert_eq!(
        svc.get_reputation_summary(a).unwrap(),
        ReputationSummary { total_ratings: 2, average_score: 500 }
    );
    assert_eq!(
        svc.get_reputation_summary(b).unwrap(),
        ReputationSummary { total_ratings: 1, average_score: 100 }
    );
    assert!(svc.has_address_rated(a, &rater(2)).unwrap());
    assert!(!svc.has_address_rated(b, &rater(2)).unwrap());
}

#[test]
fn self_rating_follows_current_owner() {
    let svc = ReputationService::in_memory();
    let id = register(&svc, "0xalice");

    svc.transfer_agent(id, p("0xbob"), &p("0xalice")).unwrap();

    assert_matches!(svc.submit_rating(id, 5, &p("0xbob")), Err(RegistryError::CannotRateOwnAgent(_)));
    svc.submit_rating(id, 2, &p("0xalice")).unwrap();

    let details = svc.get_agent_details(id).unwrap();
    assert_eq!(details.owner, p("0xbob"));
    assert_eq!(details.creator, p("0xdeployer"));
    assert_eq!(svc.get_reputation_summary(id).unwrap().total_ratings, 1);
}

#[test]
fn metadata_uri_is_stored_verbatim() {
    let svc = ReputationService::in_memory();
    let uri = "  data:application/json,{\"name\":\"agent ü\"}  ".to_string();
    let id = svc.register_agent(p("0xo"), uri.clone(), &p("0xc")).unwrap();
    assert_eq!(svc.get_agent_details(id).unwrap().metadata_uri, uri);
}
