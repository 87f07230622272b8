//! Префиксное дерево подписок.
//!
//! Каждый узел хранит подписчиков, зарегистрированных ровно на его пути, и
//! дочерние узлы по следующему сегменту. Публикация по пути `P` доходит до
//! подписчиков на каждом префиксе `P`, включая корень, и не доходит до более
//! длинных путей.
//!
//! Роутер не синхронизирован: им владеет и мутирует его только цикл брокера.

use std::{
    collections::{HashMap, HashSet},
    marker::PhantomData,
    sync::Arc,
};

use super::{intern::intern_segment, Delivery, Subscriber, TopicPath};
use crate::BrokerError;

/// Итог одной публикации.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Подписчики, принявшие значение.
    pub delivered: usize,
    /// Подписчики, у которых значение было отброшено.
    pub dropped: usize,
}

#[derive(Debug)]
struct Node<H> {
    subscribers: HashSet<H>,
    children: HashMap<Arc<str>, Node<H>>,
}

impl<H> Default for Node<H> {
    fn default() -> Self {
        Self {
            subscribers: HashSet::new(),
            children: HashMap::new(),
        }
    }
}

/// Роутер тем для значений типа `T` и подписчиков типа `H`.
#[derive(Debug)]
pub struct Router<T, H> {
    root: Node<H>,
    _value: PhantomData<fn(T)>,
}

impl<T, H> Default for Router<T, H> {
    fn default() -> Self {
        Self {
            root: Node::default(),
            _value: PhantomData,
        }
    }
}

impl<T, H> Router<T, H>
where
    T: Clone,
    H: Subscriber<T>,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Регистрирует `handle` на `path`, создавая недостающие узлы.
    ///
    /// Один и тот же обработчик можно подписать на разные пути, но не дважды
    /// на один. Сегменты ключей берутся из пула: пул растёт только вместе с
    /// деревом, публикации его не трогают.
    pub fn subscribe(
        &mut self,
        handle: H,
        path: &TopicPath,
    ) -> Result<(), BrokerError> {
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.children.entry(intern_segment(segment)).or_default();
        }
        if node.subscribers.insert(handle) {
            Ok(())
        } else {
            Err(BrokerError::DuplicateSubscription)
        }
    }

    /// Снимает `handle` ровно с `path`.
    ///
    /// Отсутствующий путь или подписка не считаются ошибкой. Узлы не удаляются, даже
    /// если остались пустыми. Возвращает `true`, если подписка была снята.
    pub fn unsubscribe(
        &mut self,
        handle: &H,
        path: &TopicPath,
    ) -> bool {
        let mut node = &mut self.root;
        for segment in path.segments() {
            match node.children.get_mut(segment) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.subscribers.remove(handle)
    }

    /// Доставляет `value` подписчикам на всех префиксах `path`.
    ///
    /// Доставка неблокирующая: если подписчик не готов принять значение, оно
    /// для него теряется.
    pub fn publish(
        &self,
        value: T,
        path: &TopicPath,
    ) -> PublishReport {
        let mut report = PublishReport::default();
        let mut node = &self.root;
        let mut segments = path.segments().iter();
        loop {
            for subscriber in &node.subscribers {
                match subscriber.try_deliver(value.clone()) {
                    Delivery::Delivered => report.delivered += 1,
                    Delivery::Full | Delivery::Closed => report.dropped += 1,
                }
            }
            let Some(segment) = segments.next() else {
                break;
            };
            match node.children.get(segment) {
                Some(child) => node = child,
                None => break,
            }
        }
        report
    }

    /// Закрывает каждый ещё не закрытый обработчик ровно один раз.
    ///
    /// `already_closed` накапливает закрытые обработчики, поэтому
    /// обработчик, подписанный на несколько путей, получит одно уведомление.
    /// Возвращает число обработчиков, закрытых этим вызовом.
    pub fn close_all(
        &self,
        already_closed: &mut HashSet<H>,
    ) -> usize {
        let mut closed = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            for subscriber in &node.subscribers {
                if already_closed.insert(subscriber.clone()) {
                    subscriber.close();
                    closed += 1;
                }
            }
            stack.extend(node.children.values());
        }
        closed
    }

    /// Общее число подписок (пар обработчик/путь).
    pub fn subscription_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += node.subscribers.len();
            stack.extend(node.children.values());
        }
        count
    }

    /// Число узлов без учёта корня.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += node.children.len();
            stack.extend(node.children.values());
        }
        count
    }
}
