use {
    crate::{
        display_json, from_str_json, serutil::ElementList, AccessRequest, ActionList, Actor, Decision, Effect,
        Principal, ResourceList,
    },
    derive_builder::Builder,
    log::trace,
    serde::{
        de::{Deserializer, MapAccess, Visitor},
        Deserialize, Serialize,
    },
    std::{
        cell::RefCell,
        fmt::{Formatter, Result as FmtResult},
    },
};

#[derive(Builder, Clone, Debug, Eq, PartialEq, Serialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct Statement {
    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    sid: Option<String>,

    effect: Effect,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    principal: Option<Principal>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    not_principal: Option<Principal>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<ActionList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    not_action: Option<ActionList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<ResourceList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    not_resource: Option<ResourceList>,
}

impl Statement {
    pub fn builder() -> StatementBuilder {
        StatementBuilder::default()
    }

    #[inline]
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    #[inline]
    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    #[inline]
    pub fn action(&self) -> Option<&ActionList> {
        self.action.as_ref()
    }

    #[inline]
    pub fn not_action(&self) -> Option<&ActionList> {
        self.not_action.as_ref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&ResourceList> {
        self.resource.as_ref()
    }

    #[inline]
    pub fn not_resource(&self) -> Option<&ResourceList> {
        self.not_resource.as_ref()
    }

    #[inline]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    #[inline]
    pub fn not_principal(&self) -> Option<&Principal> {
        self.not_principal.as_ref()
    }

    /// Whether the statement names its principal, as resource-based (bucket) policy statements must.
    #[inline]
    pub fn has_principal(&self) -> bool {
        self.principal.is_some() || self.not_principal.is_some()
    }

    /// Evaluate this statement alone against a request.
    ///
    /// Returns the statement's effect as a [Decision] if every element matches, or [Decision::DefaultDeny] if the
    /// statement does not apply. `holder` is the principal an identity policy is attached to; statements without a
    /// `Principal` or `NotPrincipal` element only apply to requests made by the holder.
    pub fn evaluate(&self, request: &AccessRequest, holder: Option<&Actor>) -> Decision {
        // Does the action match the request?
        let action_matched = match (self.action(), self.not_action()) {
            (Some(actions), _) => actions.iter().any(|a| a.matches(request.service(), request.api())),
            (None, Some(actions)) => !actions.iter().any(|a| a.matches(request.service(), request.api())),
            (None, None) => false,
        };

        if !action_matched {
            return Decision::DefaultDeny;
        }

        // Does the resource match the request?
        let candidate = request.resource();
        let resource_matched = match (self.resource(), self.not_resource()) {
            (Some(resources), _) => resources.iter().any(|r| r.matches(candidate)),
            (None, Some(resources)) => {
                let excluded = resources.iter().find(|r| r.matches(candidate));
                if let Some(resource) = excluded {
                    trace!("NotResource: candidate {} matched resource {}", candidate, resource);
                }
                excluded.is_none()
            }
            (None, None) => false,
        };

        if !resource_matched {
            return Decision::DefaultDeny;
        }

        // Does the principal match the request?
        let actor = request.principal();
        let principal_matched = match (self.principal(), self.not_principal()) {
            (Some(principal), _) => principal.matches(actor),
            (None, Some(principal)) => !principal.matches(actor),
            (None, None) => match holder {
                Some(holder) => holder.same_identity(actor),
                None => {
                    trace!("Statement {:?} has no principal and no holder; it cannot apply", self.sid);
                    false
                }
            },
        };

        if !principal_matched {
            return Decision::DefaultDeny;
        }

        // Everything matches here. Return the effect.
        self.effect.decision()
    }
}

display_json!(Statement);
from_str_json!(Statement);

pub type StatementList = ElementList<Statement>;

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StatementVisitor::default())
    }
}

/// Reads a statement map. When given a slot, the `Sid` is copied into it as soon as it is read, so a caller can name
/// the statement even if a later field fails.
#[derive(Default)]
pub(crate) struct StatementVisitor<'a> {
    sid: Option<&'a RefCell<Option<String>>>,
}

impl<'a> StatementVisitor<'a> {
    pub(crate) fn recording_sid(sid: &'a RefCell<Option<String>>) -> Self {
        Self {
            sid: Some(sid),
        }
    }
}

impl<'de, 'a> Visitor<'de> for StatementVisitor<'a> {
    type Value = Statement;

    fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str("a map of statement properties")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Statement, A::Error> {
        let mut builder = Statement::builder();
        let mut sid_seen = false;
        let mut effect_seen = false;
        let mut action_seen = false;
        let mut not_action_seen = false;
        let mut resource_seen = false;
        let mut not_resource_seen = false;
        let mut principal_seen = false;
        let mut not_principal_seen = false;

        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                "Sid" => {
                    if sid_seen {
                        return Err(serde::de::Error::duplicate_field("Sid"));
                    }

                    sid_seen = true;
                    let sid = access.next_value::<String>()?;
                    if let Some(slot) = self.sid {
                        slot.replace(Some(sid.clone()));
                    }
                    builder.sid(sid);
                }
                "Effect" => {
                    if effect_seen {
                        return Err(serde::de::Error::duplicate_field("Effect"));
                    }

                    effect_seen = true;
                    builder.effect(access.next_value::<Effect>()?);
                }
                "Action" => {
                    if action_seen {
                        return Err(serde::de::Error::duplicate_field("Action"));
                    }

                    action_seen = true;
                    builder.action(access.next_value::<ActionList>()?);
                }
                "NotAction" => {
                    if not_action_seen {
                        return Err(serde::de::Error::duplicate_field("NotAction"));
                    }

                    not_action_seen = true;
                    builder.not_action(access.next_value::<ActionList>()?);
                }
                "Resource" => {
                    if resource_seen {
                        return Err(serde::de::Error::duplicate_field("Resource"));
                    }

                    resource_seen = true;
                    builder.resource(access.next_value::<ResourceList>()?);
                }
                "NotResource" => {
                    if not_resource_seen {
                        return Err(serde::de::Error::duplicate_field("NotResource"));
                    }

                    not_resource_seen = true;
                    builder.not_resource(access.next_value::<ResourceList>()?);
                }
                "Principal" => {
                    if principal_seen {
                        return Err(serde::de::Error::duplicate_field("Principal"));
                    }

                    principal_seen = true;
                    builder.principal(access.next_value::<Principal>()?);
                }
                "NotPrincipal" => {
                    if not_principal_seen {
                        return Err(serde::de::Error::duplicate_field("NotPrincipal"));
                    }

                    not_principal_seen = true;
                    builder.not_principal(access.next_value::<Principal>()?);
                }
                _ => {
                    return Err(serde::de::Error::unknown_field(
                        &key,
                        &["Sid", "Effect", "Action", "NotAction", "Resource", "NotResource", "Principal", "NotPrincipal"],
                    ));
                }
            }
        }

        builder.build().map_err(|e| match e {
            StatementBuilderError::ValidationError(s) => {
                let msg2 = s.replace('.', ";").trim_end_matches(|c| c == ';').to_string();
                serde::de::Error::custom(StatementBuilderError::ValidationError(msg2))
            }
            _ => serde::de::Error::custom(e),
        })
    }
}

impl StatementBuilder {
    fn validate(&self) -> Result<(), StatementBuilderError> {
        let mut errors = Vec::with_capacity(5);
        if self.effect.is_none() {
            errors.push("Effect must be set.");
        }

        match (&self.action, &self.not_action) {
            (Some(Some(_)), Some(Some(_))) => errors.push("Action and NotAction cannot both be set."),
            (Some(Some(_)), _) | (_, Some(Some(_))) => (),
            _ => errors.push("Either Action or NotAction must be set."),
        }

        match (&self.resource, &self.not_resource) {
            (Some(Some(_)), Some(Some(_))) => errors.push("Resource and NotResource cannot both be set."),
            (Some(Some(_)), _) | (_, Some(Some(_))) => (),
            _ => errors.push("Either Resource or NotResource must be set."),
        }

        if let (Some(Some(_)), Some(Some(_))) = (&self.principal, &self.not_principal) {
            errors.push("Principal and NotPrincipal cannot both be set.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StatementBuilderError::ValidationError(errors.join(" ")))
        }
    }
}
