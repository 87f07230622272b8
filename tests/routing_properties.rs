use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use topicbus::{subscription_channel, BrokerError, Router, SubscriberHandle, TopicPath};

const HANDLES: usize = 4;

/// Короткие пути из маленького алфавита, чтобы префиксы часто совпадали.
fn path_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..4)
        .prop_map(|segments| segments.into_iter().map(String::from).collect())
}

fn subscriptions_strategy() -> impl Strategy<Value = Vec<(usize, Vec<String>)>> {
    prop::collection::vec((0..HANDLES, path_strategy()), 0..16)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Тест проверяет, что публикация доходит ровно до подписок на префиксы
    /// пути публикации, и по одной копии на каждую такую подписку.
    #[test]
    fn prop_publish_reaches_exactly_prefix_subscriptions(
        subscriptions in subscriptions_strategy(),
        publish_path in path_strategy(),
    ) {
        let mut router: Router<u32, SubscriberHandle<u32>> = Router::new();
        let (handles, mut subs): (Vec<_>, Vec<_>) =
            (0..HANDLES).map(|_| subscription_channel::<u32>(64)).unzip();

        let mut model: HashSet<(usize, Vec<String>)> = HashSet::new();
        for (idx, path) in &subscriptions {
            let result = router.subscribe(handles[*idx].clone(), &TopicPath::new(path));
            let fresh = model.insert((*idx, path.clone()));
            if fresh {
                prop_assert_eq!(result, Ok(()));
            } else {
                prop_assert_eq!(result, Err(BrokerError::DuplicateSubscription));
            }
        }
        prop_assert_eq!(router.subscription_count(), model.len());

        let report = router.publish(7, &TopicPath::new(&publish_path));

        let mut expected: HashMap<usize, usize> = HashMap::new();
        for (idx, path) in &model {
            if publish_path.starts_with(path) {
                *expected.entry(*idx).or_default() += 1;
            }
        }
        prop_assert_eq!(report.delivered, expected.values().sum::<usize>());
        prop_assert_eq!(report.dropped, 0);

        for (idx, sub) in subs.iter_mut().enumerate() {
            prop_assert_eq!(sub.len(), expected.get(&idx).copied().unwrap_or(0));
        }
    }

    /// Тест проверяет, что после отписки от всех путей публикация никуда не
    /// доходит, а узлы дерева остаются на месте.
    #[test]
    fn prop_unsubscribe_all_stops_delivery(
        subscriptions in subscriptions_strategy(),
        publish_path in path_strategy(),
    ) {
        let mut router: Router<u32, SubscriberHandle<u32>> = Router::new();
        let (handles, subs): (Vec<_>, Vec<_>) =
            (0..HANDLES).map(|_| subscription_channel::<u32>(64)).unzip();

        for (idx, path) in &subscriptions {
            let _ = router.subscribe(handles[*idx].clone(), &TopicPath::new(path));
        }
        let nodes = router.node_count();

        for (idx, path) in &subscriptions {
            router.unsubscribe(&handles[*idx], &TopicPath::new(path));
        }
        prop_assert_eq!(router.subscription_count(), 0);
        prop_assert_eq!(router.node_count(), nodes);

        let report = router.publish(1, &TopicPath::new(&publish_path));
        prop_assert_eq!(report.delivered, 0);
        prop_assert!(subs.iter().all(|s| s.is_empty()));
    }

    /// Тест проверяет, что остановка закрывает каждый подписанный обработчик
    /// ровно один раз, сколько бы путей у него ни было.
    #[test]
    fn prop_close_all_closes_each_handle_once(
        subscriptions in subscriptions_strategy(),
    ) {
        let mut router: Router<u32, SubscriberHandle<u32>> = Router::new();
        let (handles, subs): (Vec<_>, Vec<_>) =
            (0..HANDLES).map(|_| subscription_channel::<u32>(4)).unzip();

        let mut subscribed = HashSet::new();
        for (idx, path) in &subscriptions {
            let _ = router.subscribe(handles[*idx].clone(), &TopicPath::new(path));
            subscribed.insert(*idx);
        }

        let mut closed = HashSet::new();
        prop_assert_eq!(router.close_all(&mut closed), subscribed.len());
        // Повторный проход с тем же набором ничего не закрывает.
        prop_assert_eq!(router.close_all(&mut closed), 0);

        for (idx, sub) in subs.iter().enumerate() {
            prop_assert_eq!(sub.is_closed(), subscribed.contains(&idx));
        }
    }
}
