use agentreg_ledger::{
    MemorySink, Notification, NotificationSink, Principal, RegistryError, ReputationService,
};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::thread;

/// A subscriber that tries to call back into the service it is attached to.
#[derive(Default)]
struct CallbackSink {
    service: OnceLock<Weak<ReputationService>>,
    outcomes: Mutex<Vec<Result<(), RegistryError>>>,
}

impl NotificationSink for CallbackSink {
    fn deliver(&self, notification: &Notification) {
        let Some(service) = self.service.get().and_then(Weak::upgrade) else {
            return;
        };
        let outcome = match notification {
            Notification::AgentRegistered(n) => service
                .submit_rating(n.id, 5, &Principal::new("0xsubscriber"))
                .map(|_| ()),
            Notification::RatingSubmitted(n) => service.get_reputation_summary(n.id).map(|_| ()),
            Notification::AgentTransferred(_) => service.get_total_agents().map(|_| ()),
        };
        self.outcomes.lock().unwrap().push(outcome);
    }
}

#[test]
fn subscriber_callbacks_are_rejected() {
    let sink = Arc::new(CallbackSink::default());
    let service = Arc::new(ReputationService::in_memory().with_sink(sink.clone()));
    assert!(sink.service.set(Arc::downgrade(&service)).is_ok());

    let id = service
        .register_agent(Principal::new("0xo"), "uri".into(), &Principal::new("0xc"))
        .unwrap();
    service.submit_rating(id, 3, &Principal::new("0xr")).unwrap();

    assert_eq!(
        *sink.outcomes.lock().unwrap(),
        vec![Err(RegistryError::Reentrant), Err(RegistryError::Reentrant)]
    );
    // The nested rating never landed; the outer one did.
    let record = service.get_agent(id).unwrap();
    assert_eq!((record.total_ratings, record.total_score), (1, 3));
    assert!(!service.has_address_rated(id, &Principal::new("0xsubscriber")).unwrap());

    // Once the outer call returned, the service is usable again.
    service
        .transfer_agent(id, Principal::new("0xn"), &Principal::new("0xo"))
        .unwrap();
    assert_eq!(sink.outcomes.lock().unwrap().len(), 3);
}

#[test]
fn concurrent_raters_all_land_exactly_once() {
    let sink = Arc::new(MemorySink::new());
    let service = Arc::new(ReputationService::in_memory().with_sink(sink.clone()));
    let id = service
        .register_agent(Principal::new("0xo"), String::new(), &Principal::new("0xo"))
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let rater = Principal::new(format!("0xr{}", i % 8));
                service.submit_rating(id, (i % 5 + 1) as i64, &rater)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(RegistryError::AlreadyRated(..))))
        .count();

    assert_eq!(accepted, 8);
    assert_eq!(duplicates, 8);

    let record = service.get_agent(id).unwrap();
    assert_eq!(record.total_ratings, 8);
    let accepted_sum: u64 = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|n| u64::from(n.rating_value))
        .sum();
    assert_eq!(record.total_score, accepted_sum);

    // Every notification's average matches a prefix of the committed history.
    let ratings: Vec<_> = sink
        .notifications()
        .into_iter()
        .filter_map(|n| match n {
            Notification::RatingSubmitted(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(ratings.len(), 8);
    let mut sum = 0u64;
    for (i, r) in ratings.iter().enumerate() {
        sum += u64::from(r.rating_value);
        assert_eq!(r.new_average, sum * 100 / (i as u64 + 1));
    }
}
