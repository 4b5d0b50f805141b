//! Screen/resource access policy.
//!
//! A static authorization matrix keyed by logical screen name. The
//! table is configuration data, not code — rules deserialize from JSON
//! so new screens ship without touching the guard, and the built-in
//! matrix is just the default instance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use versa_core::error::CoreResult;
use versa_core::models::audit::{actions, CreateAuditEntry};
use versa_core::models::context::ContextType;
use versa_core::models::relationship::RelationshipStatus;
use versa_core::repository::{ContextRepository, RelationshipRepository};

use crate::audit::AuditRecorder;
use crate::token::Claims;

/// Access rule for one screen. `"*"` in `roles` or `context_types`
/// matches everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenRule {
    pub roles: Vec<String>,
    pub context_types: Vec<String>,
    pub route: String,
    #[serde(default)]
    pub required_feature: Option<String>,
    #[serde(default)]
    pub requires_relationship: bool,
    #[serde(default)]
    pub requires_multiple_clients: bool,
    #[serde(default)]
    pub requires_multiple_contexts: bool,
}

impl ScreenRule {
    pub fn allows_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == "*" || r == role)
    }

    pub fn allows_context_type(&self, context_type: ContextType) -> bool {
        self.context_types
            .iter()
            .any(|t| t == "*" || t == context_type.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenAccessPolicy {
    rules: HashMap<String, ScreenRule>,
}

impl ScreenAccessPolicy {
    /// Load a policy table from JSON — the versionable external
    /// interface.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let rules: HashMap<String, ScreenRule> = serde_json::from_str(raw)?;
        Ok(Self { rules })
    }

    pub fn get(&self, screen: &str) -> Option<&ScreenRule> {
        self.rules.get(screen)
    }

    pub fn screens_for_role(&self, role: &str) -> Vec<&str> {
        let mut screens: Vec<&str> = self
            .rules
            .iter()
            .filter(|(_, rule)| rule.allows_role(role))
            .map(|(name, _)| name.as_str())
            .collect();
        screens.sort_unstable();
        screens
    }

    pub fn screens_for_context_type(&self, context_type: ContextType) -> Vec<&str> {
        let mut screens: Vec<&str> = self
            .rules
            .iter()
            .filter(|(_, rule)| rule.allows_context_type(context_type))
            .map(|(name, _)| name.as_str())
            .collect();
        screens.sort_unstable();
        screens
    }

    /// The built-in matrix.
    pub fn builtin() -> Self {
        let raw = include_str!("screen_matrix.json");
        Self::from_json(raw).expect("built-in screen matrix is valid")
    }
}

/// Feature-flag seam. The default implementation allows everything; a
/// real flag service slots in behind this trait.
pub trait FeatureFlags: Send + Sync {
    fn is_enabled(&self, feature: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllFeatures;

impl FeatureFlags for AllowAllFeatures {
    fn is_enabled(&self, _feature: &str) -> bool {
        true
    }
}

/// Why a screen was denied. Each variant carries what the caller needs
/// to explain the denial to an end user.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ScreenDenial {
    UnknownScreen,
    RoleNotAllowed {
        required_roles: Vec<String>,
        actual_role: String,
    },
    ContextTypeNotAllowed {
        allowed_context_types: Vec<String>,
        actual_context_type: ContextType,
    },
    FeatureDisabled {
        feature: String,
    },
    RelationshipNotActive {
        status: Option<RelationshipStatus>,
    },
    NotEnoughClients {
        required: u64,
        found: u64,
    },
    NotEnoughContexts {
        required: u64,
        found: u64,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScreenAccess {
    Granted,
    Denied(ScreenDenial),
}

impl ScreenAccess {
    pub fn is_granted(&self) -> bool {
        matches!(self, ScreenAccess::Granted)
    }
}

/// The guard derived from the policy table.
pub struct ScreenGuard<C, R, F = AllowAllFeatures>
where
    C: ContextRepository,
    R: RelationshipRepository,
    F: FeatureFlags,
{
    policy: ScreenAccessPolicy,
    contexts: C,
    relationships: R,
    features: F,
    audit: AuditRecorder,
}

impl<C, R, F> ScreenGuard<C, R, F>
where
    C: ContextRepository,
    R: RelationshipRepository,
    F: FeatureFlags,
{
    pub fn new(
        policy: ScreenAccessPolicy,
        contexts: C,
        relationships: R,
        features: F,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            policy,
            contexts,
            relationships,
            features,
            audit,
        }
    }

    pub fn policy(&self) -> &ScreenAccessPolicy {
        &self.policy
    }

    /// Evaluate the rule chain for a screen. "Denied" is a result, not
    /// an error; only infrastructure faults raise. Every evaluation is
    /// recorded in the audit trail.
    pub async fn check_screen_access(
        &self,
        claims: &Claims,
        screen: &str,
    ) -> CoreResult<ScreenAccess> {
        let access = self.evaluate(claims, screen).await?;

        self.audit.record(CreateAuditEntry {
            user_id: claims.sub,
            context_id: Some(claims.context_id),
            action: actions::SCREEN_ACCESS.into(),
            resource_type: "screen".into(),
            resource_id: None,
            details: serde_json::json!({
                "screen": screen,
                "access": access,
            }),
        });

        Ok(access)
    }

    async fn evaluate(&self, claims: &Claims, screen: &str) -> CoreResult<ScreenAccess> {
        let Some(rule) = self.policy.get(screen) else {
            return Ok(ScreenAccess::Denied(ScreenDenial::UnknownScreen));
        };

        // 1. Role.
        if !rule.allows_role(&claims.role) {
            return Ok(ScreenAccess::Denied(ScreenDenial::RoleNotAllowed {
                required_roles: rule.roles.clone(),
                actual_role: claims.role.clone(),
            }));
        }

        // 2. Context type.
        if !rule.allows_context_type(claims.context_type) {
            return Ok(ScreenAccess::Denied(ScreenDenial::ContextTypeNotAllowed {
                allowed_context_types: rule.context_types.clone(),
                actual_context_type: claims.context_type,
            }));
        }

        // 3. Feature flag.
        if let Some(feature) = &rule.required_feature {
            if !self.features.is_enabled(feature) {
                return Ok(ScreenAccess::Denied(ScreenDenial::FeatureDisabled {
                    feature: feature.clone(),
                }));
            }
        }

        // 4. Relationship — only evaluated for partner contexts; an
        //    enterprise context reaching a shared screen skips it.
        if rule.requires_relationship && claims.context_type == ContextType::Partner {
            let status = match (claims.partner_enterprise_id, claims.client_enterprise_id) {
                (Some(partner), Some(client)) => self
                    .relationships
                    .get_pair(partner, client)
                    .await?
                    .map(|r| r.status),
                _ => None,
            };
            if status != Some(RelationshipStatus::Active) {
                return Ok(ScreenAccess::Denied(ScreenDenial::RelationshipNotActive {
                    status,
                }));
            }
        }

        // 5. Multiplicity.
        if rule.requires_multiple_clients {
            let found = match claims.partner_enterprise_id {
                Some(partner) => {
                    self.contexts
                        .count_distinct_clients(claims.sub, partner)
                        .await?
                }
                None => 0,
            };
            if found < 2 {
                return Ok(ScreenAccess::Denied(ScreenDenial::NotEnoughClients {
                    required: 2,
                    found,
                }));
            }
        }

        if rule.requires_multiple_contexts {
            let found = self.contexts.count_active_contexts(claims.sub).await?;
            if found < 2 {
                return Ok(ScreenAccess::Denied(ScreenDenial::NotEnoughContexts {
                    required: 2,
                    found,
                }));
            }
        }

        Ok(ScreenAccess::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matrix_parses() {
        let policy = ScreenAccessPolicy::builtin();
        assert!(policy.get("context-switcher").is_some());
        assert!(policy.get("partner-dashboard").is_some());
        assert!(policy.get("no-such-screen").is_none());
    }

    #[test]
    fn wildcard_rules_match_everything() {
        let policy = ScreenAccessPolicy::builtin();
        let rule = policy.get("approved-tools-marketplace").unwrap();
        assert!(rule.allows_role("partner_user"));
        assert!(rule.allows_role("made_up_role"));
        assert!(rule.allows_context_type(ContextType::Partner));
        assert!(rule.allows_context_type(ContextType::AgencySeat));
    }

    #[test]
    fn role_listing_respects_rules() {
        let policy = ScreenAccessPolicy::builtin();
        let screens = policy.screens_for_role("partner_admin");
        assert!(screens.contains(&"partner-dashboard"));
        assert!(!screens.contains(&"executive-dashboard"));
    }

    #[test]
    fn custom_table_loads_from_json() {
        let raw = r#"{
            "custom-screen": {
                "roles": ["enterprise_admin"],
                "context_types": ["enterprise"],
                "route": "/custom",
                "requires_relationship": false
            }
        }"#;
        let policy = ScreenAccessPolicy::from_json(raw).unwrap();
        let rule = policy.get("custom-screen").unwrap();
        assert!(rule.allows_role("enterprise_admin"));
        assert!(!rule.allows_role("seat_user"));
        assert!(rule.required_feature.is_none());
    }
}
