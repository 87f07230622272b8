use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::{runtime::Runtime, sync::oneshot};
use topicbus::{Broker, BrokerClient, Subscription};

/// Запускает брокер на `runtime` и подписывает `subscribers` обработчиков на
/// `bench`. Подписки возвращаются, чтобы их буферы не закрылись.
fn start(
    runtime: &Runtime,
    subscribers: usize,
) -> (BrokerClient<u64>, oneshot::Sender<()>, Vec<Subscription<u64>>) {
    let broker = Broker::<u64>::new();
    let client = broker.client();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    runtime.spawn(broker.run(stop_rx));

    let subs = runtime.block_on(async {
        let mut subs = Vec::with_capacity(subscribers);
        for _ in 0..subscribers {
            let (handle, sub) = client.channel();
            client.subscribe(&handle, "bench").await.unwrap();
            subs.push(sub);
        }
        subs
    });
    (client, stop_tx, subs)
}

fn bench_publish_round_trip(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let mut group = c.benchmark_group("broker_publish_round_trip");
    for subscribers in [0usize, 1, 10, 100] {
        let (client, stop_tx, _subs) = start(&runtime, subscribers);
        group.bench_function(BenchmarkId::from_parameter(subscribers), |b| {
            b.to_async(&runtime)
                .iter(|| async { client.publish(black_box(1), "bench/x").await.unwrap() })
        });
        let _ = stop_tx.send(());
    }
    group.finish();
}

fn bench_subscribe_unsubscribe(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let (client, stop_tx, _subs) = start(&runtime, 0);
    let (handle, _sub) = client.channel();
    c.bench_function("broker_subscribe_unsubscribe", |b| {
        b.to_async(&runtime).iter(|| async {
            client.subscribe(&handle, "a/b/c").await.unwrap();
            client.unsubscribe(&handle, "a/b/c").await.unwrap();
        })
    });
    let _ = stop_tx.send(());
}

criterion_group!(benches, bench_publish_round_trip, bench_subscribe_unsubscribe);
criterion_main!(benches);
