//! Plan and configuration validation that collects all errors.

use crate::configuration::Configuration;
use crate::error::{PlanError, ReferenceKind};
use crate::plan::Plan;

/// Validate the structure of a plan.
///
/// Checks that every name referenced from the critical actions, conditions,
/// dependencies and recoveries resolves in the plan, and that no action sets
/// a zero exec timeout. Every issue is collected so all of them can be
/// reported at once. Cycles are allowed and are not reported.
#[must_use]
pub fn validate_plan(plan: &Plan) -> Vec<PlanError> {
    let mut errors = Vec::new();

    for name in &plan.critical_actions {
        if !plan.contains(name) {
            errors.push(PlanError::UnknownCriticalAction { name: name.clone() });
        }
    }

    for name in plan.action_names() {
        let action = &plan.actions[name];
        let lists = [
            (ReferenceKind::Condition, &action.conditions),
            (ReferenceKind::Dependency, &action.dependencies),
            (ReferenceKind::Recovery, &action.recovery_actions),
        ];
        for (kind, refs) in lists {
            for reference in refs {
                if !plan.contains(reference) {
                    errors.push(PlanError::UnknownReference {
                        action: name.to_string(),
                        kind,
                        name: reference.clone(),
                    });
                }
            }
        }
        if action.exec_timeout.is_some_and(|t| t.is_zero()) {
            errors.push(PlanError::ZeroTimeout {
                action: name.to_string(),
            });
        }
    }

    errors
}

/// Validate a plan's structure and check every exec name with `exec_exists`.
///
/// Actions without an exec are always valid.
#[must_use]
pub fn validate_plan_with_execs<F>(plan: &Plan, exec_exists: F) -> Vec<PlanError>
where
    F: Fn(&str) -> bool,
{
    let mut errors = validate_plan(plan);
    for name in plan.action_names() {
        let action = &plan.actions[name];
        if !action.is_noop() && !exec_exists(&action.exec_name) {
            errors.push(PlanError::UnknownExec {
                action: name.to_string(),
                exec: action.exec_name.clone(),
            });
        }
    }
    errors
}

/// Validate a whole configuration.
///
/// Reports a configuration without plans, listed plans that are not defined,
/// and every per-plan issue tagged with its plan name.
#[must_use]
pub fn validate_configuration<F>(config: &Configuration, exec_exists: F) -> Vec<PlanError>
where
    F: Fn(&str) -> bool,
{
    let mut errors = Vec::new();

    if config.plans.is_empty() {
        errors.push(PlanError::NoPlans);
        return errors;
    }

    for name in &config.plan_names {
        if !config.plans.contains_key(name) {
            errors.push(PlanError::PlanNotFound(name.clone()));
        }
    }

    let mut plan_names: Vec<&String> = config.plans.keys().collect();
    plan_names.sort_unstable();
    for name in plan_names {
        errors.extend(
            validate_plan_with_execs(&config.plans[name], &exec_exists)
                .into_iter()
                .map(|e| e.in_plan(name.as_str())),
        );
    }

    errors
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::action::Action;
    use pretty_assertions::assert_eq;

    fn known(name: &str) -> bool {
        matches!(name, "sample_pass" | "sample_fail")
    }

    #[test]
    fn valid_plan_returns_empty() {
        let plan = Plan::new()
            .with_critical_actions(["a"])
            .with_action(
                "a",
                Action::new("sample_pass")
                    .with_conditions(["c"])
                    .with_recoveries(["r"]),
            )
            .with_action("c", Action::new("sample_pass"))
            .with_action("r", Action::noop());
        let errors = validate_plan_with_execs(&plan, known);
        assert!(errors.is_empty(), "expected no errors, got: {errors:?}");
    }

    #[test]
    fn empty_plan_is_valid() {
        assert!(validate_plan(&Plan::new()).is_empty());
    }

    #[test]
    fn detects_unknown_critical_action() {
        let plan = Plan::new().with_critical_actions(["missing"]);
        assert_eq!(
            validate_plan(&plan),
            vec![PlanError::UnknownCriticalAction {
                name: "missing".into()
            }]
        );
    }

    #[test]
    fn detects_unknown_references_in_every_list() {
        let plan = Plan::new().with_action(
            "a",
            Action::noop()
                .with_conditions(["c"])
                .with_dependencies(["d"])
                .with_recoveries(["r"]),
        );
        let kinds: Vec<ReferenceKind> = validate_plan(&plan)
            .into_iter()
            .map(|e| match e {
                PlanError::UnknownReference { kind, .. } => kind,
                other => panic!("unexpected error: {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                ReferenceKind::Condition,
                ReferenceKind::Dependency,
                ReferenceKind::Recovery
            ]
        );
    }

    #[test]
    fn detects_zero_timeout() {
        let plan = Plan::new().with_action("a", Action::noop().with_timeout(Duration::ZERO));
        assert!(
            validate_plan(&plan)
                .iter()
                .any(|e| matches!(e, PlanError::ZeroTimeout { .. }))
        );
    }

    #[test]
    fn detects_unknown_exec() {
        let plan = Plan::new()
            .with_action("a", Action::new("no_such_exec"))
            .with_action("b", Action::noop());
        assert_eq!(
            validate_plan_with_execs(&plan, known),
            vec![PlanError::UnknownExec {
                action: "a".into(),
                exec: "no_such_exec".into()
            }]
        );
    }

    #[test]
    fn cycles_are_allowed() {
        let plan = Plan::new()
            .with_critical_actions(["a"])
            .with_action("a", Action::noop().with_dependencies(["b"]))
            .with_action("b", Action::noop().with_recoveries(["a"]));
        assert!(validate_plan(&plan).is_empty());
    }

    #[test]
    fn configuration_without_plans() {
        let config = Configuration::default();
        assert_eq!(validate_configuration(&config, known), vec![PlanError::NoPlans]);
    }

    #[test]
    fn configuration_errors_carry_plan_name() {
        let mut config = Configuration::default();
        config.plan_names = vec!["repair".into(), "deploy".into()];
        config.plans.insert(
            "repair".into(),
            Plan::new().with_critical_actions(["ghost"]),
        );
        let errors = validate_configuration(&config, known);
        assert_eq!(
            errors,
            vec![
                PlanError::PlanNotFound("deploy".into()),
                PlanError::UnknownCriticalAction {
                    name: "ghost".into()
                }
                .in_plan("repair"),
            ]
        );
    }
}
