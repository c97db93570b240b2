//! Handler functions for CLI commands.
//!
//! Each `render_*` function returns the text it would print so it can be
//! tested; the `cmd_*` wrappers print it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use warden_acl::{
    AccessDecision, AccessGuard, AccessRequirement, BoundaryOutcome, PermissionMode, Session,
};
use warden_core::{Permission, PermissionArea, Principal, Registry, Role};

use crate::cli::{CheckArgs, Command, ConfigAction};
use crate::config::WardenConfig;
use crate::error::{Error, Result};

/// Subject used for the hypothetical principal in `warden check`.
const CHECK_SUBJECT: &str = "cli";

// ============================================================================
// Command dispatch
// ============================================================================

/// Run one parsed command.
pub fn run(config_path: Option<&str>, command: Command) -> Result<()> {
    let load = || WardenConfig::load(config_path);
    let output = match command {
        Command::Config { action } => return handle_config_command(config_path, action),
        Command::Roles { json } => render_roles(&load()?.registry()?, json)?,
        Command::Permissions { role, json } => {
            render_permissions(&load()?.registry()?, &role, json)?
        }
        Command::Check(args) => render_check(&load()?.guard()?, &args)?,
    };
    println!("{output}");
    Ok(())
}

/// Handle a `config` subcommand.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Init { file, force } => {
            cmd_config_init(file.as_deref().or(config_path), force)
        }
    }
}

// ============================================================================
// roles / permissions
// ============================================================================

/// Render every role and its grants.
pub fn render_roles(registry: &Registry, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(&registry.to_config())?);
    }

    let mut out = String::new();
    for (role, perms) in registry.entries() {
        let names: Vec<&str> = perms.iter().map(Permission::as_str).collect();
        out.push_str(&format!("{:<8} ({:>2})  {}\n", role, perms.len(), names.join(", ")));
    }
    let unreachable = registry.unreachable_permissions();
    if !unreachable.is_empty() {
        let names: Vec<&str> = unreachable.iter().map(Permission::as_str).collect();
        out.push_str(&format!("\nGranted to no role: {}\n", names.join(", ")));
    }
    Ok(out.trim_end().to_string())
}

/// Render one role's permissions grouped by area.
///
/// An unrecognized role name is not an error: it grants nothing, exactly as
/// it would at evaluation time.
pub fn render_permissions(registry: &Registry, role_name: &str, json: bool) -> Result<String> {
    let areas: BTreeMap<PermissionArea, Vec<Permission>> = match role_name.parse::<Role>() {
        Ok(role) => registry.permission_areas(role),
        Err(_) => {
            log::warn!("'{role_name}' is not a recognized role; it grants nothing");
            BTreeMap::new()
        }
    };

    if json {
        return Ok(serde_json::to_string_pretty(&areas)?);
    }
    if areas.is_empty() {
        return Ok(format!("{role_name}: (no permissions)"));
    }

    let mut out = format!("{role_name}:\n");
    for (area, perms) in &areas {
        let names: Vec<&str> = perms.iter().map(Permission::as_str).collect();
        out.push_str(&format!("  {:<14} {}\n", format!("{area}:"), names.join(", ")));
    }
    Ok(out.trim_end().to_string())
}

// ============================================================================
// check
// ============================================================================

/// Result of `warden check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// The evaluated session (`absent`, `loading`, `present: cli`).
    pub session: String,
    /// Recognized roles of the principal.
    pub roles: Vec<Role>,
    /// Role names that were ignored.
    pub ignored_roles: Vec<String>,
    /// Effective permission set.
    pub permissions: Vec<Permission>,
    /// Inline decision (honors the permission mode).
    pub inline: AccessDecision,
    /// Boundary outcome (permission check is any-of).
    pub boundary: BoundaryOutcome,
}

/// Build the requirement described by `args`.
pub fn requirement_from_args(args: &CheckArgs) -> Result<AccessRequirement> {
    let roles = args
        .require_roles
        .iter()
        .map(|r| r.parse::<Role>().map_err(|_| Error::UnknownRole(r.clone())))
        .collect::<Result<Vec<_>>>()?;
    let permissions = args
        .require_permissions
        .iter()
        .map(|p| {
            p.parse::<Permission>()
                .map_err(|_| Error::UnknownPermission(p.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut req = AccessRequirement::new().any_role(roles).permissions(permissions);
    if args.all {
        req = req.require_all();
    }
    if let Some(target) = &args.redirect_to {
        req = req.redirect_to(target.clone());
    }
    Ok(req)
}

/// The session described by `args`.
pub fn session_from_args(args: &CheckArgs) -> Session {
    if args.anonymous {
        Session::Absent
    } else if args.loading {
        Session::Loading
    } else {
        Session::present(Principal::new(CHECK_SUBJECT).with_raw_roles(args.roles.iter()))
    }
}

/// Evaluate a requirement both inline and at a boundary.
pub fn evaluate(guard: &AccessGuard, args: &CheckArgs) -> Result<CheckReport> {
    let requirement = requirement_from_args(args)?;
    let session = session_from_args(args);
    let resolver = guard.resolver();

    let (roles, ignored_roles, permissions) = match session.principal() {
        Some(p) => {
            let ignored: Vec<String> = resolver
                .unknown_roles_of(p)
                .into_iter()
                .map(str::to_string)
                .collect();
            if !ignored.is_empty() {
                log::warn!("Ignoring unrecognized roles: {}", ignored.join(", "));
            }
            (
                resolver.known_roles_of(p),
                ignored,
                resolver.effective_permissions(p).into_iter().collect(),
            )
        }
        None => (Vec::new(), Vec::new(), Vec::new()),
    };

    Ok(CheckReport {
        session: session.to_string(),
        roles,
        ignored_roles,
        permissions,
        inline: guard.check(session.principal(), &requirement),
        boundary: guard.boundary(&session, &requirement),
    })
}

/// Render the `check` report.
pub fn render_check(guard: &AccessGuard, args: &CheckArgs) -> Result<String> {
    let report = evaluate(guard, args)?;
    if args.json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let mode = if args.all {
        PermissionMode::All
    } else {
        PermissionMode::Any
    };
    let roles: Vec<&str> = report.roles.iter().map(Role::as_str).collect();
    let boundary = match &report.boundary {
        BoundaryOutcome::RenderChildren => "render".to_string(),
        BoundaryOutcome::Redirect(to) => format!("redirect to {to}"),
        BoundaryOutcome::RenderLoading => "loading placeholder".to_string(),
    };

    let mut out = format!("session:   {}\n", report.session);
    out.push_str(&format!("roles:     {}\n", display_list(&roles)));
    if !report.ignored_roles.is_empty() {
        out.push_str(&format!("ignored:   {}\n", report.ignored_roles.join(", ")));
    }
    out.push_str(&format!("inline:    {} ({mode:?})\n", report.inline));
    out.push_str(&format!("boundary:  {boundary}"));
    Ok(out)
}

fn display_list(items: &[&str]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

// ============================================================================
// config
// ============================================================================

/// Comment block written at the top of a generated config file.
const CONFIG_HEADER: &str = "\
# Warden configuration.
#
# Route destinations and the push connection are spelled out below.
# There is no [registry.roles] table, so the built-in role table applies;
# add one to change what each role grants.
";

/// Print where the config file is read from.
pub fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = WardenConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("No platform config directory; pass --config or set WARDEN_CONFIG")
    })?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("not created yet; `warden config init` writes the defaults there");
    }
    Ok(())
}

/// The text `warden config init` writes.
pub fn render_config_template() -> Result<String> {
    let body = WardenConfig::default().to_toml_string()?;
    Ok(format!("{CONFIG_HEADER}\n{body}"))
}

/// Write the default config to `file`, or to the platform location.
pub fn cmd_config_init(file: Option<&str>, force: bool) -> Result<()> {
    let target = file
        .map(PathBuf::from)
        .or_else(WardenConfig::default_config_path)
        .ok_or_else(|| Error::config("No platform config directory; pass a file path"))?;

    if target.exists() && !force {
        return Err(Error::config(format!(
            "{} already exists; pass --force to replace it",
            target.display()
        )));
    }
    if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::io_with_path(e, dir))?;
    }

    let template = render_config_template()?;
    std::fs::write(&target, template).map_err(|e| Error::io_with_path(e, &target))?;

    log::info!(
        "No [registry] section written to {}; the built-in role table applies",
        target.display()
    );
    println!("Wrote default Warden config to {}", target.display());
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use warden_acl::DenyReason;

    fn check(roles: &[&str]) -> CheckArgs {
        CheckArgs {
            roles: roles.iter().map(|r| r.to_string()).collect(),
            ..CheckArgs::default()
        }
    }

    // ------------------------------------------------------------------------
    // roles / permissions
    // ------------------------------------------------------------------------

    #[test]
    fn test_render_roles_text() {
        let out = render_roles(&Registry::builtin(), false).unwrap();
        assert!(out.contains("Admin"));
        assert!(out.contains("Guest"));
        assert!(out.contains("view_cars"));
        assert!(!out.contains("Granted to no role"));
    }

    #[test]
    fn test_render_roles_reports_unreachable() {
        let registry = Registry::builder()
            .grant(Role::Guest, [Permission::ViewCars])
            .build();
        let out = render_roles(&registry, false).unwrap();
        assert!(out.contains("Granted to no role"));
        assert!(out.contains("manage_system"));
    }

    #[test]
    fn test_render_roles_json() {
        let out = render_roles(&Registry::builtin(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["roles"]["Guest"], serde_json::json!(["view_cars"]));
    }

    #[test]
    fn test_render_permissions_grouped() {
        let out = render_permissions(&Registry::builtin(), "User", false).unwrap();
        assert!(out.starts_with("User:"));
        assert!(out.contains("bookings:"));
        assert!(out.contains("create_booking"));
        assert!(!out.contains("users:"));
    }

    #[test]
    fn test_render_permissions_unknown_role_grants_nothing() {
        let out = render_permissions(&Registry::builtin(), "Superuser", false).unwrap();
        assert_eq!(out, "Superuser: (no permissions)");

        let json = render_permissions(&Registry::builtin(), "Superuser", true).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_render_permissions_json() {
        let out = render_permissions(&Registry::builtin(), "Guest", true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["cars"], serde_json::json!(["view_cars"]));
    }

    // ------------------------------------------------------------------------
    // check
    // ------------------------------------------------------------------------

    #[test]
    fn test_check_manager_approve_all() {
        let mut args = check(&["Manager"]);
        args.require_permissions = vec![
            "approve_registration".to_string(),
            "reject_registration".to_string(),
        ];
        args.all = true;

        let report = evaluate(&AccessGuard::default(), &args).unwrap();
        assert_eq!(report.inline, AccessDecision::Allow);
        assert_eq!(report.boundary, BoundaryOutcome::RenderChildren);
        assert_eq!(report.roles, vec![Role::Manager]);
    }

    #[test]
    fn test_check_user_denied_inline_and_boundary() {
        let mut args = check(&["User"]);
        args.require_permissions = vec!["view_dashboard".to_string()];

        let report = evaluate(&AccessGuard::default(), &args).unwrap();
        assert_eq!(
            report.inline,
            AccessDecision::Deny(DenyReason::PermissionMismatch)
        );
        assert_eq!(
            report.boundary,
            BoundaryOutcome::Redirect("/unauthorized".to_string())
        );
    }

    #[test]
    fn test_check_boundary_is_any_of_while_inline_is_all() {
        let mut args = check(&["User"]);
        args.require_permissions = vec!["view_cars".to_string(), "manage_system".to_string()];
        args.all = true;

        let report = evaluate(&AccessGuard::default(), &args).unwrap();
        assert!(!report.inline.is_allowed());
        assert_eq!(report.boundary, BoundaryOutcome::RenderChildren);
    }

    #[test]
    fn test_check_unknown_principal_role_ignored() {
        let args = check(&["Guest", "Superuser"]);
        let report = evaluate(&AccessGuard::default(), &args).unwrap();
        assert_eq!(report.roles, vec![Role::Guest]);
        assert_eq!(report.ignored_roles, vec!["Superuser".to_string()]);
        assert_eq!(report.permissions, vec![Permission::ViewCars]);
    }

    #[test]
    fn test_check_anonymous_redirects_to_login() {
        let args = CheckArgs {
            anonymous: true,
            ..CheckArgs::default()
        };
        let report = evaluate(&AccessGuard::default(), &args).unwrap();
        assert_eq!(report.session, "absent");
        assert_eq!(
            report.inline,
            AccessDecision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(report.boundary, BoundaryOutcome::Redirect("/login".to_string()));
    }

    #[test]
    fn test_check_loading() {
        let args = CheckArgs {
            loading: true,
            ..CheckArgs::default()
        };
        let report = evaluate(&AccessGuard::default(), &args).unwrap();
        assert_eq!(report.boundary, BoundaryOutcome::RenderLoading);
    }

    #[test]
    fn test_check_redirect_override() {
        let mut args = check(&["Guest"]);
        args.require_roles = vec!["Admin".to_string()];
        args.redirect_to = Some("/cars".to_string());

        let report = evaluate(&AccessGuard::default(), &args).unwrap();
        assert_eq!(report.inline, AccessDecision::Deny(DenyReason::RoleMismatch));
        assert_eq!(report.boundary, BoundaryOutcome::Redirect("/cars".to_string()));
    }

    #[test]
    fn test_check_rejects_unknown_required_permission() {
        let mut args = check(&["Admin"]);
        args.require_permissions = vec!["fly_cars".to_string()];
        let err = evaluate(&AccessGuard::default(), &args).unwrap_err();
        assert!(matches!(err, Error::UnknownPermission(_)));
    }

    #[test]
    fn test_check_rejects_unknown_required_role() {
        let mut args = check(&["Admin"]);
        args.require_roles = vec!["Root".to_string()];
        let err = evaluate(&AccessGuard::default(), &args).unwrap_err();
        assert!(matches!(err, Error::UnknownRole(_)));
    }

    #[test]
    fn test_render_check_text() {
        let args = check(&["Guest", "Superuser"]);
        let out = render_check(&AccessGuard::default(), &args).unwrap();
        assert!(out.contains("session:   present: cli"));
        assert!(out.contains("ignored:   Superuser"));
        assert!(out.contains("inline:    allow"));
        assert!(out.contains("boundary:  render"));
    }

    #[test]
    fn test_render_check_json() {
        let mut args = check(&["User"]);
        args.require_permissions = vec!["view_reports".to_string()];
        args.json = true;

        let out = render_check(&AccessGuard::default(), &args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["inline"]["decision"], "deny");
        assert_eq!(value["inline"]["reason"], "permission_mismatch");
        assert_eq!(value["boundary"]["outcome"], "redirect");
        assert_eq!(value["boundary"]["target"], "/unauthorized");
    }

    // ------------------------------------------------------------------------
    // config
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_path_explicit() {
        assert!(cmd_config_path(Some("/explicit/config.toml")).is_ok());
    }

    #[test]
    fn test_cmd_config_init_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("warden").join("config.toml");

        cmd_config_init(Some(path.to_str().unwrap()), false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[routes]"));
        assert!(content.contains("[realtime]"));

        let loaded = WardenConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded, WardenConfig::default());
    }

    #[test]
    fn test_config_template_leaves_registry_builtin() {
        let template = render_config_template().unwrap();
        assert!(template.starts_with("# Warden configuration."));
        assert!(!template.contains("[registry"));

        let parsed = WardenConfig::from_toml_str(&template).unwrap();
        assert!(parsed.registry.is_none());
        assert_eq!(parsed.registry().unwrap(), Registry::builtin());
    }

    #[test]
    fn test_cmd_config_init_no_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "existing").unwrap();

        let result = cmd_config_init(Some(path.to_str().unwrap()), false);
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[test]
    fn test_cmd_config_init_force_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "old content").unwrap();

        cmd_config_init(Some(path.to_str().unwrap()), true).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, render_config_template().unwrap());
    }

    #[test]
    fn test_run_uses_config_registry() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[registry.roles]\nGuest = [\"view_cars\"]\n").unwrap();

        let result = run(
            Some(path.to_str().unwrap()),
            Command::Roles { json: false },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_surfaces_bad_registry() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[registry.roles]\nRoot = [\"view_cars\"]\n").unwrap();

        let result = run(
            Some(path.to_str().unwrap()),
            Command::Roles { json: false },
        );
        assert!(matches!(result, Err(Error::Core(_))));
    }
}
