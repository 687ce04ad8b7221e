//! Command-line lane requests
//!
//! Turns `laneway run [PLATFORM] LANE [key:value ...]` tokens into a lane
//! request against a loaded [`Registry`].

use regex::Regex;
use tracing::debug;

use super::registry::Registry;
use super::value::{Map, Value};
use crate::error::RequestError;

/// `key:value` with an identifier key
const PARAM_PATTERN: &str = r"^([A-Za-z_][A-Za-z0-9_]*):(.*)$";

/// A lane to run, with its parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LaneRequest {
    pub platform: Option<String>,
    pub lane: String,
    pub params: Map,
}

/// Parse a command-line parameter value
///
/// `true`/`false` become booleans and integers become numbers; everything
/// else stays a string.
pub fn param_value(text: &str) -> Value {
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => text
            .parse::<i64>()
            .map_or_else(|_| Value::string(text), Value::Int),
    }
}

/// Split `key:value` tokens from lane tokens
pub fn split_tokens(tokens: &[String]) -> (Vec<String>, Map) {
    let Ok(re) = Regex::new(PARAM_PATTERN) else {
        return (tokens.to_vec(), Map::new());
    };

    let mut targets = Vec::new();
    let mut params = Map::new();
    for token in tokens {
        match re.captures(token) {
            Some(caps) => {
                params.insert(caps[1].to_string(), param_value(&caps[2]));
            }
            None => targets.push(token.clone()),
        }
    }
    (targets, params)
}

/// Build a request from command-line tokens
///
/// With two lane tokens the first must name a platform. With one, the
/// `default_platform` is used when it declares that lane, otherwise the lane
/// is looked up at the root.
pub fn plan_request(
    tokens: &[String],
    registry: &Registry,
    default_platform: Option<&str>,
) -> Result<LaneRequest, RequestError> {
    let (targets, params) = split_tokens(tokens);

    let (platform, lane) = match targets.as_slice() {
        [] => return Err(RequestError::MissingLane),
        [lane] => {
            let platform = default_platform
                .filter(|p| registry.lane(Some(*p), lane).is_some())
                .map(str::to_string);
            (platform, lane.clone())
        }
        [scope, lane] => {
            if registry.is_platform_block(scope)? {
                (Some(scope.clone()), lane.clone())
            } else {
                return Err(RequestError::TooManyTargets(targets.clone()));
            }
        }
        _ => return Err(RequestError::TooManyTargets(targets.clone())),
    };

    debug!(
        "Planned lane '{lane}' on platform {:?} with {} parameter(s)",
        platform,
        params.len()
    );
    Ok(LaneRequest {
        platform,
        lane,
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lanefile::Lanefile;
    use crate::error::RunnerError;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    const SOURCE: &str = "lane :test {\n}\nplatform :ios {\n  lane :beta {\n  }\n}\n";

    #[test]
    fn test_param_values() {
        assert_eq!(param_value("true"), Value::Bool(true));
        assert_eq!(param_value("42"), Value::Int(42));
        assert_eq!(param_value("1.2.3"), Value::from("1.2.3"));
        assert_eq!(param_value(""), Value::from(""));
    }

    #[test]
    fn test_split_tokens() {
        let (targets, params) = split_tokens(&tokens(&["ios", "beta", "build:12", "url:http://x"]));
        assert_eq!(targets, tokens(&["ios", "beta"]));
        assert_eq!(params.get("build"), Some(&Value::Int(12)));
        assert_eq!(params.get("url"), Some(&Value::from("http://x")));
    }

    #[test]
    fn test_plan_platform_lane() {
        let lanefile = Lanefile::parse(SOURCE).unwrap();
        let request = plan_request(&tokens(&["ios", "beta"]), lanefile.registry(), None).unwrap();
        assert_eq!(request.platform.as_deref(), Some("ios"));
        assert_eq!(request.lane, "beta");
    }

    #[test]
    fn test_plan_uses_default_platform_only_when_it_has_the_lane() {
        let lanefile = Lanefile::parse(SOURCE).unwrap();
        let beta = plan_request(&tokens(&["beta"]), lanefile.registry(), Some("ios")).unwrap();
        assert_eq!(beta.platform.as_deref(), Some("ios"));

        let test = plan_request(&tokens(&["test"]), lanefile.registry(), Some("ios")).unwrap();
        assert_eq!(test.platform, None);
    }

    #[test]
    fn test_plan_errors() {
        let lanefile = Lanefile::parse(SOURCE).unwrap();
        let registry = lanefile.registry();

        assert!(matches!(
            plan_request(&[], registry, None),
            Err(RequestError::MissingLane)
        ));
        assert!(matches!(
            plan_request(&tokens(&["test", "beta"]), registry, None),
            Err(RequestError::TooManyTargets(_))
        ));
        assert!(matches!(
            plan_request(&tokens(&["android", "beta"]), registry, None),
            Err(RequestError::Runner(RunnerError::UnknownScope { .. }))
        ));
    }
}
