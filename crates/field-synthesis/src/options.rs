use heck::ToLowerCamelCase;

/// Knobs for the [`GraphTypeAssembler`](crate::GraphTypeAssembler).
///
/// Usually embedded in a host configuration file:
///
/// ```toml
/// sort_fields = true
/// instance_source = "services"
/// name_case = "preserve"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SynthesisOptions {
    /// Emit fields in alphabetical order instead of declaration order.
    pub sort_fields: bool,
    /// Drop a trailing `Async` from method names returning an asynchronous result.
    pub strip_async_suffix: bool,
    /// Where instance members get their owning object from.
    pub instance_source: InstanceSource,
    /// Casing applied to derived field and argument names. Explicit names are kept verbatim.
    pub name_case: NameCase,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        SynthesisOptions {
            sort_fields: false,
            strip_async_suffix: true,
            instance_source: InstanceSource::default(),
            name_case: NameCase::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InstanceSource {
    /// The value the field is resolved on.
    #[default]
    Source,
    /// The service provider of the invocation, keyed by the declaring type name.
    Services,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCase {
    Preserve,
    #[default]
    Camel,
}

impl NameCase {
    pub(crate) fn apply(self, name: &str) -> String {
        match self {
            NameCase::Preserve => name.to_string(),
            NameCase::Camel => name.to_lower_camel_case(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_keys() {
        let options: SynthesisOptions = toml::from_str("sort_fields = true").unwrap();

        assert_eq!(
            options,
            SynthesisOptions {
                sort_fields: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn full_configuration() {
        let options: SynthesisOptions = toml::from_str(
            r#"
            sort_fields = false
            strip_async_suffix = false
            instance_source = "services"
            name_case = "preserve"
            "#,
        )
        .unwrap();

        assert!(!options.strip_async_suffix);
        assert_eq!(options.instance_source, InstanceSource::Services);
        assert_eq!(options.name_case, NameCase::Preserve);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = toml::from_str::<SynthesisOptions>("sort = true").unwrap_err();
        assert!(err.to_string().contains("unknown field `sort`"), "{err}");
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(NameCase::Camel.apply("GetUser"), "getUser");
        assert_eq!(NameCase::Camel.apply("created_at"), "createdAt");
        assert_eq!(NameCase::Preserve.apply("GetUser"), "GetUser");
    }
}
