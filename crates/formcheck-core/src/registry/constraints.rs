//! Built-in constraints and constraint methods
//!
//! Plain constraints receive the checked value as their first param. Card
//! constraints accept the card type as an optional second param. Methods
//! take their bounds from declared params, so a profile uses them in
//! structured form, for example
//! `{"constraint_method": "length_between", "params": [3, 20]}`.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use super::Registry;
use crate::callable::{param_int, param_str, ConstraintFn};
use crate::context::ConstraintContext;
use crate::{Error, ParamValue, Result, Verdict};
use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"), ("AK", "Alaska"), ("AZ", "Arizona"), ("AR", "Arkansas"),
    ("CA", "California"), ("CO", "Colorado"), ("CT", "Connecticut"), ("DE", "Delaware"),
    ("DC", "District of Columbia"), ("FL", "Florida"), ("GA", "Georgia"), ("HI", "Hawaii"),
    ("ID", "Idaho"), ("IL", "Illinois"), ("IN", "Indiana"), ("IA", "Iowa"),
    ("KS", "Kansas"), ("KY", "Kentucky"), ("LA", "Louisiana"), ("ME", "Maine"),
    ("MD", "Maryland"), ("MA", "Massachusetts"), ("MI", "Michigan"), ("MN", "Minnesota"),
    ("MS", "Mississippi"), ("MO", "Missouri"), ("MT", "Montana"), ("NE", "Nebraska"),
    ("NV", "Nevada"), ("NH", "New Hampshire"), ("NJ", "New Jersey"), ("NM", "New Mexico"),
    ("NY", "New York"), ("NC", "North Carolina"), ("ND", "North Dakota"), ("OH", "Ohio"),
    ("OK", "Oklahoma"), ("OR", "Oregon"), ("PA", "Pennsylvania"), ("RI", "Rhode Island"),
    ("SC", "South Carolina"), ("SD", "South Dakota"), ("TN", "Tennessee"), ("TX", "Texas"),
    ("UT", "Utah"), ("VT", "Vermont"), ("VA", "Virginia"), ("WA", "Washington"),
    ("WV", "West Virginia"), ("WI", "Wisconsin"), ("WY", "Wyoming"),
    ("AS", "American Samoa"), ("GU", "Guam"), ("MP", "Northern Mariana Islands"),
    ("PR", "Puerto Rico"), ("VI", "Virgin Islands"), ("FM", "Federated States of Micronesia"),
    ("MH", "Marshall Islands"), ("PW", "Palau"), ("AA", "Armed Forces Americas"),
    ("AE", "Armed Forces Europe"), ("AP", "Armed Forces Pacific"),
];

const CA_PROVINCES: &[(&str, &str)] = &[
    ("AB", "Alberta"), ("BC", "British Columbia"), ("MB", "Manitoba"),
    ("NB", "New Brunswick"), ("NL", "Newfoundland and Labrador"), ("NF", "Newfoundland"),
    ("NS", "Nova Scotia"), ("NT", "Northwest Territories"), ("NU", "Nunavut"),
    ("ON", "Ontario"), ("PE", "Prince Edward Island"), ("QC", "Quebec"),
    ("SK", "Saskatchewan"), ("YT", "Yukon"),
];

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
        )
        .expect("email pattern")
    })
}

fn zip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d{5}(?:-\d{4})?)\s*$").expect("zip pattern"))
}

fn postcode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([ABCEGHJKLMNPRSTVXYabceghjklmnprstvxy]\d[A-Za-z])\s*-?\s*(\d[A-Za-z]\d)\s*$")
            .expect("postcode pattern")
    })
}

/// Register every built-in constraint and constraint method
pub fn register_builtins(registry: &Registry) {
    registry.register_constraint("email", plain(|v| Verdict::check(email_re().is_match(v), v)));
    registry.register_constraint("state", plain(state));
    registry.register_constraint("province", plain(province));
    registry.register_constraint(
        "state_or_province",
        plain(|v| match state(v) {
            Verdict::Rejected => province(v),
            matched => matched,
        }),
    );
    registry.register_constraint("zip", plain(zip));
    registry.register_constraint("postcode", plain(postcode));
    registry.register_constraint(
        "zip_or_postcode",
        plain(|v| match zip(v) {
            Verdict::Rejected => postcode(v),
            matched => matched,
        }),
    );
    registry.register_constraint("phone", plain(|v| Verdict::check(digit_count(v) >= 6, v)));
    registry.register_constraint(
        "american_phone",
        plain(|v| Verdict::check(digit_count(v) >= 7, v)),
    );
    registry.register_constraint(
        "cc_number",
        ConstraintFn::plain(|params| {
            let number = param_str(params, 0).unwrap_or_default();
            Ok(cc_number(number, param_str(params, 1)))
        }),
    );
    registry.register_constraint(
        "cc_exp",
        plain(|v| Verdict::check(card_not_expired(v, Local::now().date_naive()), v)),
    );
    registry.register_constraint("cc_type", plain(cc_type));
    registry.register_constraint("ip_address", plain(|v| Verdict::check(is_ipv4(v), v)));

    registry.register_method("length_between", length_between);
    registry.register_method("min_length", |ctx, params| {
        let min = bound(params, 0, "min_length")?;
        Ok(Verdict::check(ctx.value().chars().count() >= min, ctx.value()))
    });
    registry.register_method("max_length", |ctx, params| {
        let max = bound(params, 0, "max_length")?;
        Ok(Verdict::check(ctx.value().chars().count() <= max, ctx.value()))
    });
    registry.register_method("eq_with", |ctx, params| {
        if params.is_empty() {
            return Err(Error::invalid_params("eq_with", "expects the field to compare with"));
        }
        let other = param_str(params, 0);
        Ok(Verdict::check(other == Some(ctx.value()), ctx.value()))
    });
    registry.register_method("num_values", |ctx, params| {
        let wanted = bound(params, 0, "num_values")?;
        Ok(Verdict::check(field_len(ctx) == wanted, ctx.value()))
    });
    registry.register_method("num_values_between", |ctx, params| {
        let (min, max) = bounds(params, "num_values_between")?;
        let count = field_len(ctx);
        Ok(Verdict::check(count >= min && count <= max, ctx.value()))
    });
}

fn plain<F>(f: F) -> ConstraintFn
where
    F: Fn(&str) -> Verdict + Send + Sync + 'static,
{
    ConstraintFn::plain(move |params| Ok(f(param_str(params, 0).unwrap_or_default())))
}

fn lookup_region(table: &[(&str, &str)], value: &str) -> Verdict {
    let wanted = value.trim();
    let found = table.iter().any(|(code, name)| {
        code.eq_ignore_ascii_case(wanted) || name.eq_ignore_ascii_case(wanted)
    });
    Verdict::check(found, wanted)
}

/// US state or territory, by code or name
pub fn state(value: &str) -> Verdict {
    lookup_region(US_STATES, value)
}

/// Canadian province or territory, by code or name
pub fn province(value: &str) -> Verdict {
    lookup_region(CA_PROVINCES, value)
}

/// US zip or zip+4; matches the code without surrounding whitespace
pub fn zip(value: &str) -> Verdict {
    match zip_re().captures(value).and_then(|c| c.get(1)) {
        Some(m) => Verdict::Matched(m.as_str().to_string()),
        None => Verdict::Rejected,
    }
}

/// Canadian postal code; matches the normalised `A1A 1A1` form
pub fn postcode(value: &str) -> Verdict {
    match postcode_re().captures(value) {
        Some(caps) => match (caps.get(1), caps.get(2)) {
            (Some(first), Some(second)) => Verdict::Matched(format!(
                "{} {}",
                first.as_str().to_uppercase(),
                second.as_str().to_uppercase()
            )),
            _ => Verdict::Rejected,
        },
        None => Verdict::Rejected,
    }
}

fn digit_count(value: &str) -> usize {
    value.chars().filter(char::is_ascii_digit).count()
}

/// Card type code: Mastercard, Visa, American Express or Discover
pub fn cc_type(value: &str) -> Verdict {
    match value.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some(c @ ('M' | 'V' | 'A' | 'D')) => Verdict::Matched(c.to_string()),
        _ => Verdict::Rejected,
    }
}

/// Card number passing the Luhn check and, when a type is given, its prefix and length rules
pub fn cc_number(value: &str, card_type: Option<&str>) -> Verdict {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 12 || digits.len() > 19 || !luhn(&digits) {
        return Verdict::Rejected;
    }

    let type_ok = match card_type.and_then(|t| t.trim().chars().next()) {
        None => true,
        Some(t) => match t.to_ascii_uppercase() {
            'M' => digits.len() == 16 && ("51"..="55").contains(&&digits[..2]),
            'V' => (digits.len() == 13 || digits.len() == 16) && digits.starts_with('4'),
            'A' => digits.len() == 15 && (digits.starts_with("34") || digits.starts_with("37")),
            'D' => digits.len() == 16 && digits.starts_with("6011"),
            _ => false,
        },
    };

    Verdict::check(type_ok, &digits)
}

fn luhn(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// `MM/YY` or `MM/YYYY` expiry that is the current month or later
pub fn card_not_expired(value: &str, today: NaiveDate) -> bool {
    let Some((month, year)) = value.trim().split_once('/') else {
        return false;
    };
    let (Ok(month), Ok(mut year)) = (month.trim().parse::<u32>(), year.trim().parse::<i32>()) else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }
    if year < 100 {
        year += if year < 70 { 2000 } else { 1900 };
    }

    year > today.year() || (year == today.year() && month >= today.month())
}

fn is_ipv4(value: &str) -> bool {
    let octets: Vec<&str> = value.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            !octet.is_empty()
                && octet.len() <= 3
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

fn bound(params: &[ParamValue], index: usize, constraint: &str) -> Result<usize> {
    let raw = param_int(params, index).ok_or_else(|| {
        Error::invalid_params(constraint, format!("param {} must be an integer", index + 1))
    })?;
    usize::try_from(raw)
        .map_err(|_| Error::invalid_params(constraint, format!("param {} must not be negative", index + 1)))
}

fn bounds(params: &[ParamValue], constraint: &str) -> Result<(usize, usize)> {
    let min = bound(params, 0, constraint)?;
    let max = bound(params, 1, constraint)?;
    if min > max {
        return Err(Error::invalid_params(
            constraint,
            format!("minimum {} is greater than maximum {}", min, max),
        ));
    }
    Ok((min, max))
}

fn length_between(ctx: &mut ConstraintContext<'_>, params: &[ParamValue]) -> Result<Verdict> {
    let (min, max) = bounds(params, "length_between")?;
    let len = ctx.value().chars().count();
    Ok(Verdict::check(len >= min && len <= max, ctx.value()))
}

fn field_len(ctx: &ConstraintContext<'_>) -> usize {
    ctx.field_value()
        .map(|value| value.iter().filter(|v| !v.is_empty()).count())
        .unwrap_or(0)
}
