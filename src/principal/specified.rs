use {
    super::AwsPrincipal,
    crate::{display_json, serutil::StringLikeList, Actor},
    derive_builder::Builder,
    serde::{Deserialize, Serialize},
};

/// A `Principal` element given as a map of principal types to values.
#[derive(Builder, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(deny_unknown_fields)]
pub struct SpecifiedPrincipal {
    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "AWS", default, skip_serializing_if = "Option::is_none")]
    aws: Option<StringLikeList<AwsPrincipal>>,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Service", default, skip_serializing_if = "Option::is_none")]
    service: Option<StringLikeList<String>>,
}

display_json!(SpecifiedPrincipal);

impl SpecifiedPrincipal {
    #[inline]
    pub fn builder() -> SpecifiedPrincipalBuilder {
        SpecifiedPrincipalBuilder::default()
    }

    #[inline]
    pub fn aws(&self) -> Option<&StringLikeList<AwsPrincipal>> {
        self.aws.as_ref()
    }

    #[inline]
    pub fn service(&self) -> Option<&StringLikeList<String>> {
        self.service.as_ref()
    }

    pub fn matches(&self, actor: &Actor) -> bool {
        match actor {
            Actor::Service(name) => match self.service() {
                Some(services) => services.iter().any(|service| service == name),
                None => false,
            },
            _ => match self.aws() {
                Some(aws_ids) => aws_ids.iter().any(|aws_id| aws_id.matches(actor)),
                None => false,
            },
        }
    }
}

impl SpecifiedPrincipalBuilder {
    fn validate(&self) -> Result<(), SpecifiedPrincipalBuilderError> {
        let aws_set = matches!(self.aws, Some(Some(_)));
        let service_set = matches!(self.service, Some(Some(_)));

        if aws_set || service_set {
            Ok(())
        } else {
            Err(SpecifiedPrincipalBuilderError::ValidationError("At least one principal type must be set.".to_string()))
        }
    }
}
