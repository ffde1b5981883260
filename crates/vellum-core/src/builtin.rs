//! Built-in conversions for common standard-library leaf types

use crate::descriptor::{Reflected, TypeDescriptor};
use crate::error::{ReifyError, ReifyResult};
use crate::reflect::scalar_descriptor;
use std::time::Duration;
use vellum_doc::DocNode;

/// Durations accept plain seconds (`1.5`) or colon-separated
/// `HH:MM:SS[.frac]` / `MM:SS[.frac]` text.
impl Reflected for Duration {
    fn build_descriptor() -> TypeDescriptor {
        scalar_descriptor::<Duration>(parse_duration)
    }
}

fn parse_duration(text: &str, node: &DocNode) -> ReifyResult<Duration> {
    let trimmed = text.trim();
    let invalid = || ReifyError::conversion::<Duration>(text, node);

    if trimmed.contains(':') {
        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid());
        }
        let mut minutes: u64 = 0;
        for part in &parts[..parts.len() - 1] {
            let value: u64 = part.parse().map_err(|_| invalid())?;
            minutes = minutes * 60 + value;
        }
        let seconds: f64 = parts[parts.len() - 1].parse().map_err(|_| invalid())?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(invalid());
        }
        Duration::try_from_secs_f64(minutes as f64 * 60.0 + seconds).map_err(|_| invalid())
    } else {
        let seconds: f64 = trimmed.parse().map_err(|_| invalid())?;
        Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_doc::Origin;

    fn node(text: &str) -> DocNode {
        DocNode::scalar(text, Origin::new("test"))
    }

    fn parse(text: &str) -> ReifyResult<Duration> {
        let node = node(text);
        parse_duration(text, &node)
    }

    #[test]
    fn test_plain_seconds() {
        assert_eq!(parse("90").unwrap(), Duration::from_secs(90));
        assert_eq!(parse("1.5").unwrap(), Duration::from_millis(1500));
    }

    #[test]
    fn test_colon_forms() {
        assert_eq!(parse("01:30").unwrap(), Duration::from_secs(90));
        assert_eq!(parse("1:00:00").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse("0:00:00.25").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse("abc").is_err());
        assert!(parse("-5").is_err());
        assert!(parse("1:99").is_err());
        assert!(parse("1:2:3:4").is_err());
    }
}
