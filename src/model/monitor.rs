use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::common::config::MonitorDescription;
use crate::common::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorId(pub u32);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    pub id: MonitorId,
    pub name: String,
    pub rect: Rect,
}

/// Left-to-right, then top-to-bottom.
fn position_order(a: &Monitor, b: &Monitor) -> Ordering {
    let (a, b) = (a.rect.origin, b.rect.origin);
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

pub fn sorted_by_position(monitors: &[Monitor]) -> Vec<&Monitor> {
    let mut sorted: Vec<_> = monitors.iter().collect();
    sorted.sort_by(|a, b| position_order(a, b));
    sorted
}

impl MonitorDescription {
    /// Finds the monitor this description names.
    ///
    /// `monitors` is in the order the native layer reported them; the first
    /// one is the main monitor.
    pub fn resolve(&self, monitors: &[Monitor]) -> Option<MonitorId> {
        let main = monitors.first()?;
        match self {
            MonitorDescription::Index(i) => {
                let index = i.checked_sub(1)?;
                sorted_by_position(monitors).get(index).map(|m| m.id)
            }
            MonitorDescription::Pattern(p) if p == "main" => Some(main.id),
            MonitorDescription::Pattern(p) if p == "secondary" => match monitors {
                [_, other] => Some(other.id),
                _ => None,
            },
            MonitorDescription::Pattern(p) => {
                let regex = MonitorDescription::regex(p).ok()?;
                sorted_by_position(monitors)
                    .into_iter()
                    .find(|m| regex.is_match(&m.name))
                    .map(|m| m.id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitors() -> Vec<Monitor> {
        vec![
            Monitor {
                id: MonitorId(1),
                name: "Built-in Retina Display".into(),
                rect: Rect::new(0., 0., 1512., 982.),
            },
            Monitor {
                id: MonitorId(2),
                name: "DELL U2720Q".into(),
                rect: Rect::new(-2560., 0., 2560., 1440.),
            },
        ]
    }

    #[test]
    fn index_is_left_to_right() {
        let m = monitors();
        assert_eq!(MonitorDescription::Index(1).resolve(&m), Some(MonitorId(2)));
        assert_eq!(MonitorDescription::Index(2).resolve(&m), Some(MonitorId(1)));
        assert_eq!(MonitorDescription::Index(3).resolve(&m), None);
        assert_eq!(MonitorDescription::Index(0).resolve(&m), None);
    }

    #[test]
    fn main_and_secondary() {
        let m = monitors();
        let main = MonitorDescription::Pattern("main".into());
        let secondary = MonitorDescription::Pattern("secondary".into());
        assert_eq!(main.resolve(&m), Some(MonitorId(1)));
        assert_eq!(secondary.resolve(&m), Some(MonitorId(2)));
        assert_eq!(secondary.resolve(&m[..1]), None);
        assert_eq!(main.resolve(&[]), None);
    }

    #[test]
    fn pattern_is_case_insensitive() {
        let m = monitors();
        assert_eq!(
            MonitorDescription::Pattern("^dell".into()).resolve(&m),
            Some(MonitorId(2))
        );
        assert_eq!(
            MonitorDescription::Pattern("retina".into()).resolve(&m),
            Some(MonitorId(1))
        );
        assert_eq!(MonitorDescription::Pattern("lg".into()).resolve(&m), None);
        assert_eq!(MonitorDescription::Pattern("(".into()).resolve(&m), None);
    }
}
