//! Подсистема Publish–Subscribe (pub/sub) с иерархическими темами.
//!
//! - `broker`: цикл брокера, команды и клиент для публикации и подписки.
//! - `intern` (приватный): пул сегментов тем.
//! - `router`: префиксное дерево подписок, которым владеет цикл брокера.
//! - `stats`: счётчики публикаций и доставок.
//! - `subscriber`: обработчики подписчиков и принимающая сторона подписки.
//! - `topic`: пути тем.

pub mod broker;
mod intern;
pub mod router;
pub mod stats;
pub mod subscriber;
pub mod topic;

pub use broker::*;
pub use router::*;
pub use stats::*;
pub use subscriber::*;
pub use topic::*;
