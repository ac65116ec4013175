//! User account panel

use super::PanelContext;
use crate::state::{FormDefinition, FormField, MatchConstraint, SelectOption};

pub const DEFAULT_SHELL: &str = "/bin/dash";

pub(super) fn definition(ctx: &PanelContext) -> FormDefinition {
    let editing = !ctx.is_new();
    let shells = ctx
        .candidates
        .shells
        .iter()
        .map(|path| SelectOption::named(path))
        .collect();
    let groups = ctx
        .candidates
        .groups
        .iter()
        .map(|name| SelectOption::named(name))
        .collect();

    FormDefinition::new("User")
        .field(FormField::text("name", "Name").required().read_only(editing))
        .field(FormField::text("comment", "Comment"))
        .field(FormField::text("email", "Email"))
        .field(FormField::password("password", "Password").allow_blank(editing))
        .field(FormField::password("passwordconf", "Confirm password").allow_blank(editing))
        .field(FormField::select("shell", "Shell", shells, DEFAULT_SHELL).required())
        .field(FormField::multi_select("groups", "Groups", groups))
        .field(
            FormField::checkbox("disallowusermod", "Modify account", false)
                .with_info("Disallow the user to modify their account."),
        )
        .must_match(MatchConstraint::new(
            "password",
            "passwordconf",
            "Passwords don't match",
        ))
}
