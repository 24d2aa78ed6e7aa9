//! Validation of orchestrator settings

use once_cell::sync::Lazy;
use regex::Regex;

use super::errors::GenerationError;
use super::types::{HttpVerb, Namespace};
use super::utils::is_rust_keyword;

static MODULE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid regex"));
static TYPE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(::)?([A-Za-z_][A-Za-z0-9_]*::)+[A-Z][A-Za-z0-9_]*$").expect("valid regex")
});

/// Checks the base namespace and returns it parsed.
///
/// Surrounding colons are trimmed and a leading `crate` segment is dropped,
/// since generated imports are always written relative to `crate`.
pub fn validate_base_namespace(raw: &str) -> Result<Namespace, GenerationError> {
    let mut ns = Namespace::parse(raw.trim().trim_matches(':'));
    if ns.segments().first().map(String::as_str) == Some("crate") {
        ns = Namespace::new(ns.segments()[1..].to_vec());
    }
    if ns.is_empty() {
        return Err(GenerationError::configuration(
            "`base_namespace` must be defined",
        ));
    }
    validate_segments("base_namespace", &ns)?;
    Ok(ns)
}

/// Checks a namespace given relative to the base (e.g. the models namespace).
pub fn validate_relative_namespace(field: &str, raw: &str) -> Result<Namespace, GenerationError> {
    let ns = Namespace::parse(raw);
    if ns.is_empty() {
        return Err(GenerationError::configuration(format!(
            "`{field}` must not be empty"
        )));
    }
    validate_segments(field, &ns)?;
    Ok(ns)
}

fn validate_segments(field: &str, ns: &Namespace) -> Result<(), GenerationError> {
    for segment in ns.segments() {
        if !MODULE_SEGMENT.is_match(segment) || is_rust_keyword(segment) {
            return Err(GenerationError::configuration(format!(
                "`{field}` segment `{segment}` is not a valid module name"
            )));
        }
    }
    Ok(())
}

/// Checks the base type and returns the module path it lives in.
///
/// The base type must be a path such as `clientgen::runtime::Endpoint`: at
/// least one module segment and a PascalCase type name. Its module is where
/// generated code looks for `ApiClient`, `ClientError` and friends.
pub fn validate_base_type(raw: &str) -> Result<String, GenerationError> {
    let raw = raw.trim();
    if !TYPE_PATH.is_match(raw) {
        return Err(GenerationError::configuration(format!(
            "`base_type` must be a path to an EndpointBase implementation, got `{raw}`"
        )));
    }
    match raw.rsplit_once("::") {
        Some((module, _)) if !module.is_empty() => Ok(module.to_string()),
        _ => Err(GenerationError::configuration(format!(
            "`base_type` `{raw}` has no module"
        ))),
    }
}

/// Checks that the expected content type looks like `type/subtype`.
pub fn validate_content_type(raw: &str) -> Result<(), GenerationError> {
    match raw.split_once('/') {
        Some((kind, subtype)) if !kind.trim().is_empty() && !subtype.trim().is_empty() => Ok(()),
        _ => Err(GenerationError::configuration(format!(
            "`content_type` must look like `type/subtype`, got `{raw}`"
        ))),
    }
}

/// Checks that at least one verb is enabled.
pub fn validate_verbs(verbs: &[HttpVerb]) -> Result<(), GenerationError> {
    if verbs.is_empty() {
        return Err(GenerationError::configuration(
            "`verbs` must enable at least one HTTP verb",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_namespace() {
        assert_eq!(
            validate_base_namespace("api::school").unwrap().to_string(),
            "api::school"
        );
        assert_eq!(validate_base_namespace("::api::").unwrap().to_string(), "api");
        assert_eq!(validate_base_namespace("crate::api").unwrap().to_string(), "api");

        assert!(matches!(
            validate_base_namespace(""),
            Err(GenerationError::ConfigurationError(_))
        ));
        assert!(validate_base_namespace("::").is_err());
        assert!(validate_base_namespace("crate").is_err());
        assert!(validate_base_namespace("Api").is_err());
        assert!(validate_base_namespace("api::type").is_err());
        assert!(validate_base_namespace("api-v1").is_err());
    }

    #[test]
    fn test_validate_base_type() {
        assert_eq!(
            validate_base_type("clientgen::runtime::Endpoint").unwrap(),
            "clientgen::runtime"
        );
        assert_eq!(
            validate_base_type("crate::client::SkyEndpoint").unwrap(),
            "crate::client"
        );
        assert_eq!(validate_base_type("::my_rt::Endpoint").unwrap(), "::my_rt");

        assert!(validate_base_type("Endpoint").is_err());
        assert!(validate_base_type("clientgen::runtime::endpoint").is_err());
        assert!(validate_base_type("clientgen::runtime::").is_err());
        assert!(validate_base_type("").is_err());
    }

    #[test]
    fn test_validate_content_type_and_verbs() {
        assert!(validate_content_type("application/json").is_ok());
        assert!(validate_content_type("json").is_err());
        assert!(validate_content_type("application/").is_err());

        assert!(validate_verbs(&[HttpVerb::Get]).is_ok());
        assert!(validate_verbs(&[]).is_err());
    }

    #[test]
    fn test_validate_relative_namespace() {
        assert_eq!(
            validate_relative_namespace("models_namespace", "models")
                .unwrap()
                .to_string(),
            "models"
        );
        assert!(validate_relative_namespace("models_namespace", "").is_err());
        assert!(validate_relative_namespace("models_namespace", "Models").is_err());
    }
}
