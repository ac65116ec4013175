//! Scheduled power job (reboot or shutdown at a cron time)

use chrono::Timelike;

use super::PanelContext;
use crate::state::{ExclusionConstraint, FormDefinition, FormField, SelectOption};

pub const WILDCARD: &str = "*";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// `*` followed by every number in `range`
fn numeric_options(range: std::ops::RangeInclusive<u32>) -> Vec<SelectOption> {
    std::iter::once(SelectOption::named(WILDCARD))
        .chain(range.map(|n| SelectOption::named(&n.to_string())))
        .collect()
}

/// `*` followed by named entries numbered from 1
fn named_options(names: &[&str]) -> Vec<SelectOption> {
    std::iter::once(SelectOption::named(WILDCARD))
        .chain(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| SelectOption::new(*name, (i + 1).to_string())),
        )
        .collect()
}

pub(super) fn definition(ctx: &PanelContext) -> FormDefinition {
    let types = vec![
        SelectOption::new("Shutdown", "shutdown"),
        SelectOption::new("Reboot", "reboot"),
    ];

    FormDefinition::new("Scheduled job")
        .field(FormField::checkbox("enable", "Enable", true))
        .field(FormField::select("type", "Type", types, "reboot").required())
        .field(
            FormField::select(
                "minute",
                "Minute",
                numeric_options(0..=59),
                ctx.now.minute().to_string(),
            )
            .required(),
        )
        .field(FormField::checkbox("everynminute", "Every N minute", false))
        .field(
            FormField::select(
                "hour",
                "Hour",
                numeric_options(0..=23),
                ctx.now.hour().to_string(),
            )
            .required(),
        )
        .field(FormField::checkbox("everynhour", "Every N hour", false))
        .field(
            FormField::select("dayofmonth", "Day of month", numeric_options(1..=31), WILDCARD)
                .required(),
        )
        .field(FormField::checkbox(
            "everyndayofmonth",
            "Every N day of month",
            false,
        ))
        .field(FormField::select("month", "Month", named_options(&MONTHS), WILDCARD).required())
        .field(
            FormField::select("dayofweek", "Day of week", named_options(&WEEKDAYS), WILDCARD)
                .required(),
        )
        .field(FormField::text("comment", "Comment"))
        .exclusion(ExclusionConstraint::new("minute", "everynminute", WILDCARD))
        .exclusion(ExclusionConstraint::new("hour", "everynhour", WILDCARD))
        .exclusion(ExclusionConstraint::new(
            "dayofmonth",
            "everyndayofmonth",
            WILDCARD,
        ))
}
