//! Брокер: единственный владелец роутера.
//!
//! Все операции превращаются в команды, которые обрабатывает один цикл
//! ([`Broker::run`]). Вызывающая сторона ждёт подтверждения через `oneshot`,
//! поэтому каждая операция выглядит атомарной и сразу видна всем
//! последующим командам.

use std::{collections::HashSet, future::Future, sync::Arc};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use super::{subscription_channel, BrokerStats, Router, SubscriberHandle, Subscription, TopicPath};
use crate::{config::BrokerSettings, BrokerError};

/// Команда циклу брокера. Каждая несёт канал подтверждения.
enum Command<T> {
    Publish {
        value: T,
        path: TopicPath,
        done: oneshot::Sender<()>,
    },
    Subscribe {
        handle: SubscriberHandle<T>,
        path: TopicPath,
        done: oneshot::Sender<Result<(), BrokerError>>,
    },
    Unsubscribe {
        handle: SubscriberHandle<T>,
        path: TopicPath,
        done: oneshot::Sender<()>,
    },
}

/// Итог работы цикла брокера.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokerReport {
    /// Обработчики, получившие уведомление о закрытии.
    pub handles_closed: usize,
    /// Команды, оставшиеся в очереди на момент остановки и отклонённые.
    pub rejected_commands: usize,
}

/// Незапущенный брокер для значений типа `T`.
///
/// ```rust,ignore
/// let broker = Broker::<u32>::new();
/// let client = broker.client();
/// let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
/// let actor = tokio::spawn(broker.run(stop_rx));
///
/// let (handle, mut sub) = client.channel();
/// client.subscribe(&handle, "orders").await?;
/// client.publish(42, "orders/created").await?;
/// assert_eq!(sub.recv().await, Some(42));
///
/// stop_tx.send(()).ok();
/// actor.await?;
/// ```
pub struct Broker<T> {
    commands: mpsc::Receiver<Command<T>>,
    client: BrokerClient<T>,
    stats: Arc<BrokerStats>,
}

/// Клиент брокера: публикация, подписка и отписка.
///
/// Дешёвый в клонировании, передаётся между задачами и потоками.
pub struct BrokerClient<T> {
    commands: mpsc::Sender<Command<T>>,
    subscriber_capacity: usize,
}

/// Состояние цикла брокера.
struct Actor<T> {
    router: Router<T, SubscriberHandle<T>>,
    stats: Arc<BrokerStats>,
}

impl<T> Broker<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::with_settings(&BrokerSettings::default())
    }

    pub fn with_settings(settings: &BrokerSettings) -> Self {
        let (tx, rx) = mpsc::channel(settings.command_buffer.max(1));
        Self {
            commands: rx,
            client: BrokerClient {
                commands: tx,
                subscriber_capacity: settings.subscriber_capacity.max(1),
            },
            stats: Arc::new(BrokerStats::new()),
        }
    }

    pub fn client(&self) -> BrokerClient<T> {
        self.client.clone()
    }

    pub fn stats(&self) -> Arc<BrokerStats> {
        Arc::clone(&self.stats)
    }

    /// Запускает цикл брокера и работает, пока не завершится `exit`.
    ///
    /// Если все клиенты уничтожены раньше, цикл перестаёт принимать команды,
    /// но подписки остаются открытыми до сигнала `exit`.
    ///
    /// При остановке очередь команд закрывается, оставшиеся в ней команды
    /// отклоняются (вызывающие получают [`BrokerError::Stopped`]), затем
    /// каждый зарегистрированный обработчик закрывается ровно один раз.
    pub async fn run<F>(
        self,
        exit: F,
    ) -> BrokerReport
    where
        F: Future,
    {
        let Broker {
            mut commands,
            client,
            stats,
        } = self;
        // Собственный клиент не должен держать очередь открытой.
        drop(client);

        let mut actor = Actor {
            router: Router::new(),
            stats,
        };

        tokio::pin!(exit);
        info!("Broker started");

        loop {
            tokio::select! {
                biased;
                _ = &mut exit => {
                    info!("Broker received shutdown signal");
                    break;
                }
                command = commands.recv() => match command {
                    Some(command) => actor.handle(command),
                    None => {
                        info!("All broker clients dropped, waiting for shutdown signal");
                        (&mut exit).await;
                        info!("Broker received shutdown signal");
                        break;
                    }
                },
            }
        }

        commands.close();
        let mut rejected_commands = 0;
        while let Ok(command) = commands.try_recv() {
            // Канал подтверждения уничтожается вместе с командой.
            drop(command);
            rejected_commands += 1;
        }
        if rejected_commands > 0 {
            warn!(rejected_commands, "Rejected commands queued at shutdown");
        }

        let handles_closed = actor.router.close_all(&mut HashSet::new());
        let stats = actor.stats.snapshot();
        info!(
            handles_closed,
            rejected_commands,
            published = stats.published,
            dropped = stats.dropped,
            "Broker stopped"
        );

        BrokerReport {
            handles_closed,
            rejected_commands,
        }
    }
}

impl<T> Default for Broker<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Actor<T>
where
    T: Clone,
{
    fn handle(
        &mut self,
        command: Command<T>,
    ) {
        match command {
            Command::Publish { value, path, done } => {
                let report = self.router.publish(value, &path);
                self.stats.record_publish(report.delivered, report.dropped);
                trace!(
                    topic = %path,
                    delivered = report.delivered,
                    dropped = report.dropped,
                    "Published"
                );
                let _ = done.send(());
            }
            Command::Subscribe { handle, path, done } => {
                let id = handle.id();
                let result = self.router.subscribe(handle, &path);
                match result {
                    Ok(()) => {
                        self.stats.record_subscribe();
                        debug!(handle = %id, topic = %path, "Subscribed");
                    }
                    Err(err) => {
                        self.stats.record_duplicate();
                        debug!(handle = %id, topic = %path, error = %err, "Subscription rejected");
                    }
                }
                let _ = done.send(result);
            }
            Command::Unsubscribe { handle, path, done } => {
                if self.router.unsubscribe(&handle, &path) {
                    self.stats.record_unsubscribe();
                    debug!(handle = %handle.id(), topic = %path, "Unsubscribed");
                }
                let _ = done.send(());
            }
        }
    }
}

impl<T> BrokerClient<T>
where
    T: Send + 'static,
{
    /// Публикует `value` в `path` и ждёт, пока значение будет разослано
    /// текущим подписчикам. Медленные подписчики значение теряют.
    pub async fn publish(
        &self,
        value: T,
        path: impl Into<TopicPath>,
    ) -> Result<(), BrokerError> {
        let path = path.into();
        self.request(|done| Command::Publish { value, path, done })
            .await
    }

    /// Подписывает `handle` на `path` и все его продолжения.
    ///
    /// Повторная подписка того же обработчика на тот же путь возвращает
    /// [`BrokerError::DuplicateSubscription`].
    pub async fn subscribe(
        &self,
        handle: &SubscriberHandle<T>,
        path: impl Into<TopicPath>,
    ) -> Result<(), BrokerError> {
        let handle = handle.clone();
        let path = path.into();
        self.request(|done| Command::Subscribe { handle, path, done })
            .await?
    }

    /// Снимает подписку `handle` ровно с `path`. Обработчик не закрывается.
    pub async fn unsubscribe(
        &self,
        handle: &SubscriberHandle<T>,
        path: impl Into<TopicPath>,
    ) -> Result<(), BrokerError> {
        let handle = handle.clone();
        let path = path.into();
        self.request(|done| Command::Unsubscribe { handle, path, done })
            .await
    }

    /// Блокирующий вариант [`publish`](Self::publish) для потоков вне
    /// async-рантайма.
    ///
    /// # Panics
    ///
    /// Паникует при вызове из асинхронного контекста.
    pub fn blocking_publish(
        &self,
        value: T,
        path: impl Into<TopicPath>,
    ) -> Result<(), BrokerError> {
        let path = path.into();
        self.blocking_request(|done| Command::Publish { value, path, done })
    }

    /// Блокирующий вариант [`subscribe`](Self::subscribe).
    pub fn blocking_subscribe(
        &self,
        handle: &SubscriberHandle<T>,
        path: impl Into<TopicPath>,
    ) -> Result<(), BrokerError> {
        let handle = handle.clone();
        let path = path.into();
        self.blocking_request(|done| Command::Subscribe { handle, path, done })?
    }

    /// Блокирующий вариант [`unsubscribe`](Self::unsubscribe).
    pub fn blocking_unsubscribe(
        &self,
        handle: &SubscriberHandle<T>,
        path: impl Into<TopicPath>,
    ) -> Result<(), BrokerError> {
        let handle = handle.clone();
        let path = path.into();
        self.blocking_request(|done| Command::Unsubscribe { handle, path, done })
    }

    /// Новая пара обработчик/подписка с ёмкостью буфера из настроек.
    pub fn channel(&self) -> (SubscriberHandle<T>, Subscription<T>) {
        subscription_channel(self.subscriber_capacity)
    }

    /// Брокер остановлен или уничтожен.
    pub fn is_stopped(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request<R>(
        &self,
        command: impl FnOnce(oneshot::Sender<R>) -> Command<T>,
    ) -> Result<R, BrokerError> {
        let (done, reply) = oneshot::channel();
        self.commands
            .send(command(done))
            .await
            .map_err(|_| BrokerError::Stopped)?;
        reply.await.map_err(|_| BrokerError::Stopped)
    }

    fn blocking_request<R>(
        &self,
        command: impl FnOnce(oneshot::Sender<R>) -> Command<T>,
    ) -> Result<R, BrokerError> {
        let (done, reply) = oneshot::channel();
        self.commands
            .blocking_send(command(done))
            .map_err(|_| BrokerError::Stopped)?;
        reply.blocking_recv().map_err(|_| BrokerError::Stopped)
    }
}

impl<T> Clone for BrokerClient<T> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            subscriber_capacity: self.subscriber_capacity,
        }
    }
}
