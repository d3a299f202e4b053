use screenflow::reactive::{
    DisposeBag, KeyedReplaySubject, Observable, ObservableExt, PublishSubject, ReplayOneSubject,
    ReplaySubject, Subscription,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
enum Reading {
    Temperature(i32),
    Humidity(u8),
}

fn kind(reading: &Reading) -> &'static str {
    match reading {
        Reading::Temperature(_) => "temperature",
        Reading::Humidity(_) => "humidity",
    }
}

fn collect<T: Clone + 'static>(
    source: &impl Observable<T>,
) -> (Rc<RefCell<Vec<T>>>, Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let subscription = source.subscribe_boxed(Box::new(move |v: T| sink.borrow_mut().push(v)));
    (seen, subscription)
}

#[test]
fn keyed_subject_replays_latest_per_category() {
    let readings = KeyedReplaySubject::keyed(kind);
    readings.next(Reading::Temperature(18));
    readings.next(Reading::Humidity(40));
    readings.next(Reading::Temperature(21));

    let (seen, _subscription) = collect(&readings);

    assert_eq!(
        *seen.borrow(),
        vec![Reading::Temperature(21), Reading::Humidity(40)]
    );
}

#[test]
fn bounded_replay_keeps_the_newest_values() {
    let subject = ReplaySubject::<u32>::bounded(2);
    for v in 1..=5 {
        subject.next(v);
    }
    let (seen, _subscription) = collect(&subject);
    subject.next(6);
    assert_eq!(*seen.borrow(), vec![4, 5, 6]);
}

#[test]
fn dispose_bag_ends_every_subscription() {
    let subject = PublishSubject::<u32>::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let bag = DisposeBag::new();
    for offset in [0, 100] {
        let sink = seen.clone();
        subject
            .subscribe(move |v: u32| sink.borrow_mut().push(v + offset))
            .dispose_in(&bag);
    }

    subject.next(1);
    bag.dispose();
    subject.next(2);

    assert_eq!(*seen.borrow(), vec![1, 101]);
    assert_eq!(subject.observer_count(), 0);
    assert!(bag.is_empty());
}

#[test]
fn late_subscriber_to_completed_subject_gets_replay_only() {
    let subject = ReplaySubject::<u32>::unbounded();
    subject.next(1);
    subject.complete();

    let (seen, subscription) = collect(&subject);

    assert_eq!(*seen.borrow(), vec![1]);
    assert!(subscription.is_closed());
}

#[test]
fn observer_unsubscribing_another_mid_broadcast_stops_it() {
    let subject = PublishSubject::<u32>::new();
    let second: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
    let slot = second.clone();
    subject.subscribe(move |_: u32| {
        if let Some(subscription) = slot.borrow_mut().take() {
            subscription.unsubscribe();
        }
    });
    let (seen, subscription) = collect(&subject);
    *second.borrow_mut() = Some(subscription);

    subject.next(1);
    subject.next(2);

    assert!(seen.borrow().is_empty());
}

#[test]
fn value_emitted_while_replaying_is_delivered_after_the_replay() {
    let subject = ReplayOneSubject::with_value(0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let source = subject.clone();
    let _subscription = subject.subscribe(move |v: i32| {
        sink.borrow_mut().push(v);
        if v == 0 {
            source.next(1);
        }
    });

    assert_eq!(*seen.borrow(), vec![0, 1]);
    assert_eq!(subject.value(), Some(1));
}
