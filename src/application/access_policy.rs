//! Declarative access policies.
//!
//! Every operation declares the claim shapes it accepts as a static slice of
//! [`ClaimPattern`]s. A token is accepted when its claim matches at least one
//! pattern, and a pattern matches when the claim kind is equal and every
//! constraint holds. Constraints compare a claim field with a literal or with
//! a path parameter of the current request, which is how a token gets scoped
//! to one specific account or user.

use std::collections::HashMap;

use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::jwt::{Claim, ClaimKind, TokenCodec};
use crate::domain::entities::role::Role;

/// Raw path parameters of the current request, keyed by name.
pub type RequestContext = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimField {
    Role,
    UserId,
    AccountId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Literal(&'static str),
    Param(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Constraint {
    pub field: ClaimField,
    pub expected: Expected,
}

impl Constraint {
    pub const fn role(role: Role) -> Self {
        let literal = match role {
            Role::Admin => "admin",
            Role::User => "user",
        };
        Self {
            field: ClaimField::Role,
            expected: Expected::Literal(literal),
        }
    }

    pub const fn user_id_param(name: &'static str) -> Self {
        Self {
            field: ClaimField::UserId,
            expected: Expected::Param(name),
        }
    }

    pub const fn account_id_param(name: &'static str) -> Self {
        Self {
            field: ClaimField::AccountId,
            expected: Expected::Param(name),
        }
    }

    fn holds(&self, claim: &Claim, ctx: &RequestContext) -> bool {
        let expected = match self.expected {
            Expected::Literal(value) => value,
            Expected::Param(name) => match ctx.get(name) {
                Some(value) => value.as_str(),
                None => return false,
            },
        };

        match self.field {
            ClaimField::Role => claim.role_name() == Some(expected),
            ClaimField::UserId => ids_match(claim.user_id(), expected),
            ClaimField::AccountId => ids_match(claim.account_id(), expected),
        }
    }
}

fn ids_match(actual: Option<Uuid>, expected: &str) -> bool {
    match (actual, Uuid::parse_str(expected)) {
        (Some(actual), Ok(expected)) => actual == expected,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClaimPattern {
    pub kind: ClaimKind,
    pub constraints: &'static [Constraint],
}

impl ClaimPattern {
    pub const fn any(kind: ClaimKind) -> Self {
        Self {
            kind,
            constraints: &[],
        }
    }

    pub const fn with(kind: ClaimKind, constraints: &'static [Constraint]) -> Self {
        Self { kind, constraints }
    }

    pub fn matches(&self, claim: &Claim, ctx: &RequestContext) -> bool {
        claim.kind() == self.kind && self.constraints.iter().all(|c| c.holds(claim, ctx))
    }
}

/// Decodes `token` and checks it against `policy`.
///
/// Returns the decoded claim so callers can use the identifiers embedded in
/// it. Missing, undecodable or expired tokens are `Unauthorized`; a valid
/// token matching no pattern is `Forbidden`.
pub fn authorize(
    token: Option<&str>,
    codec: &TokenCodec,
    policy: &[ClaimPattern],
    ctx: &RequestContext,
) -> AppResult<Claim> {
    let token = token.ok_or(AppError::Unauthorized)?;
    let claim = codec.verify(token).map_err(|err| {
        tracing::debug!(error = %err, "Rejected bearer token");
        AppError::Unauthorized
    })?;

    if policy.iter().any(|pattern| pattern.matches(&claim, ctx)) {
        Ok(claim)
    } else {
        tracing::debug!(kind = ?claim.kind(), "Token matches no accepted pattern");
        Err(AppError::Forbidden)
    }
}
