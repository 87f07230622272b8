//! Иерархические темы.
//!
//! Тема: упорядоченная последовательность непрозрачных строковых сегментов,
//! например `["orders", "created"]`. Пустая последовательность означает корень,
//! подписчик на корне получает всё, что публикуется в брокере.

use std::{convert::Infallible, fmt, str::FromStr, sync::Arc};

/// Разделитель сегментов в строковом представлении темы.
pub const SEPARATOR: char = '/';

/// Путь темы.
///
/// Сегменты хранятся как `Arc<str>`, клонирование пути дешёвое. Путь
/// публикации не попадает в пул сегментов: туда попадают только сегменты
/// подписок, см. [`Router::subscribe`](super::Router::subscribe).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicPath {
    segments: Vec<Arc<str>>,
}

impl TopicPath {
    /// Корневой путь (без сегментов).
    pub fn root() -> Self {
        Self::default()
    }

    /// Собирает путь из произвольной последовательности сегментов.
    ///
    /// Сегменты не разбираются: `"a/b"` здесь считается одним сегментом.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(|s| Arc::from(s.as_ref()))
                .collect(),
        }
    }

    pub fn segments(&self) -> &[Arc<str>] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Новый путь, продлённый на один сегмент.
    pub fn child<S: AsRef<str>>(
        &self,
        segment: S,
    ) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Arc::from(segment.as_ref()));
        Self { segments }
    }

    /// `true`, если `self` является префиксом `other` (включая равенство).
    /// Корень является префиксом любого пути.
    pub fn is_prefix_of(
        &self,
        other: &TopicPath,
    ) -> bool {
        other.segments.starts_with(&self.segments)
    }
}

/// Сегменты через `/`.
///
/// Путь из одного пустого сегмента (`TopicPath::new([""])`) выводится как
/// пустая строка, которая разбирается обратно в корень. Остальные пути
/// переживают `to_string` и `parse` без изменений.
impl fmt::Display for TopicPath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Разбор строки вида `"orders/created"`.
///
/// Пустая строка разбирается в корень. Остальные строки делятся по `/` как
/// есть, так что `"a//b"` даёт три сегмента, средний из которых пустой. Путь
/// из одного пустого сегмента строкой не выражается, его собирают через
/// [`TopicPath::new`].
impl FromStr for TopicPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        Ok(Self::new(s.split(SEPARATOR)))
    }
}

impl From<&str> for TopicPath {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(path) => path,
            Err(never) => match never {},
        }
    }
}

impl From<&TopicPath> for TopicPath {
    fn from(path: &TopicPath) -> Self {
        path.clone()
    }
}

impl<const N: usize> From<[&str; N]> for TopicPath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl From<&[&str]> for TopicPath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments)
    }
}

impl From<Vec<&str>> for TopicPath {
    fn from(segments: Vec<&str>) -> Self {
        Self::new(segments)
    }
}

impl From<Vec<String>> for TopicPath {
    fn from(segments: Vec<String>) -> Self {
        Self::new(segments)
    }
}
