//! Mail notification settings

use crate::state::{CorrelationRule, FormDefinition, FormField, PropertyOp};

pub(super) fn definition() -> FormDefinition {
    FormDefinition::new("Mail notification")
        .field(FormField::checkbox("enable", "Enable", false))
        .field(FormField::text("server", "SMTP server"))
        .field(FormField::number("port", "SMTP port", 25).required())
        .field(FormField::checkbox("tls", "Use SSL/TLS secure connection", false))
        .field(FormField::text("sender", "Sender"))
        .field(FormField::checkbox("authenable", "Authentication required", false))
        .field(FormField::text("username", "Username").read_only(true))
        .field(FormField::password("password", "Password").read_only(true))
        .field(FormField::text("primaryemail", "Primary email"))
        .field(FormField::text("secondaryemail", "Secondary email"))
        .rule(
            CorrelationRule::new(["server", "sender", "primaryemail"])
                .when("enable", true)
                .with(PropertyOp::REQUIRED),
        )
        .rule(
            CorrelationRule::new(["username", "password"])
                .when("authenable", true)
                .with(PropertyOp::EDITABLE),
        )
        .rule(
            CorrelationRule::new(["username", "password"])
                .when("enable", true)
                .when("authenable", true)
                .with(PropertyOp::REQUIRED),
        )
}
