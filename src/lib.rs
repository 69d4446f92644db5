#![warn(clippy::all)]
pub(crate) mod action;
pub(crate) mod effect;
pub(crate) mod error;
pub(crate) mod eval;
pub(crate) mod policy;
pub(crate) mod policyset;
pub(crate) mod principal;
pub(crate) mod resource;
pub mod s3;
pub(crate) mod statement;

#[macro_use]
pub(crate) mod serutil;

pub use {
    action::{Action, ActionList},
    effect::Effect,
    error::PolicyError,
    eval::{AccessRequest, AccessRequestBuilder, AccessRequestBuilderError, Decision, Evaluation, Glob, StatementRef},
    policy::{Policy, PolicyBuilder, PolicyBuilderError, PolicyVersion},
    policyset::{PolicySet, PolicySource},
    principal::{
        Actor, AwsPrincipal, Principal, SpecifiedPrincipal, SpecifiedPrincipalBuilder, SpecifiedPrincipalBuilderError,
    },
    resource::{Resource, ResourceArn, ResourceList},
    statement::{Statement, StatementBuilder, StatementBuilderError, StatementList},
};
