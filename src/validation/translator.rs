//! Localized message templates for validation rule codes.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::Value;
use validator::ValidationError;

use super::Locale;

const ZH_TEMPLATES: &[(&str, &str)] = &[
    ("required", "{field}为必填字段"),
    ("length.min", "{field}长度必须至少为{min}个字符"),
    ("length.max", "{field}长度不能超过{max}个字符"),
    ("length.between", "{field}长度必须在{min}到{max}个字符之间"),
    ("length.equal", "{field}长度必须是{equal}个字符"),
    ("range.min", "{field}必须大于或等于{min}"),
    ("range.max", "{field}必须小于或等于{max}"),
    ("range.between", "{field}必须在{min}和{max}之间"),
    ("email", "{field}必须是一个有效的邮箱"),
    ("url", "{field}必须是一个有效的URL"),
    ("regex", "{field}格式不正确"),
    ("must_match", "{field}与关联字段不一致"),
    ("contains", "{field}缺少必须包含的文本"),
    ("does_not_contain", "{field}包含了不允许的文本"),
    ("credit_card", "{field}必须是一个有效的信用卡号"),
    ("ip", "{field}必须是一个有效的IP地址"),
    ("non_control_character", "{field}不能包含控制字符"),
];

const ZH_FALLBACK: &str = "{field}未通过{code}校验";

const EN_TEMPLATES: &[(&str, &str)] = &[
    ("required", "{field} is a required field"),
    ("length.min", "{field} must be at least {min} characters in length"),
    ("length.max", "{field} must be a maximum of {max} characters in length"),
    ("length.between", "{field} must be between {min} and {max} characters in length"),
    ("length.equal", "{field} must be {equal} characters in length"),
    ("range.min", "{field} must be {min} or greater"),
    ("range.max", "{field} must be {max} or less"),
    ("range.between", "{field} must be between {min} and {max}"),
    ("email", "{field} must be a valid email address"),
    ("url", "{field} must be a valid URL"),
    ("regex", "{field} has an invalid format"),
    ("must_match", "{field} does not match its related field"),
    ("contains", "{field} is missing required text"),
    ("does_not_contain", "{field} contains disallowed text"),
    ("credit_card", "{field} must be a valid credit card number"),
    ("ip", "{field} must be a valid IP address"),
    ("non_control_character", "{field} cannot contain control characters"),
];

const EN_FALLBACK: &str = "{field} failed on the '{code}' rule";

/// Turns `validator` errors into sentences for one locale.
///
/// Templates are keyed by rule code. `length` and `range` have variants
/// (`length.min`, `length.between`, ...) chosen by the parameters the rule
/// reports. Placeholders are `{field}`, `{code}` and any rule parameter.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    templates: HashMap<Cow<'static, str>, Cow<'static, str>>,
    /// Used when no template matches a rule code.
    fallback: &'static str,
}

impl Translator {
    /// Creates a translator with the default templates of `locale`.
    pub fn new(locale: Locale) -> Self {
        let (defaults, fallback) = match locale {
            Locale::Zh => (ZH_TEMPLATES, ZH_FALLBACK),
            Locale::En => (EN_TEMPLATES, EN_FALLBACK),
        };

        let templates = defaults
            .iter()
            .map(|&(key, template)| (Cow::Borrowed(key), Cow::Borrowed(template)))
            .collect();

        Self {
            locale,
            templates,
            fallback,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Adds or replaces the template for `key`.
    pub fn register(
        &mut self,
        key: impl Into<Cow<'static, str>>,
        template: impl Into<Cow<'static, str>>,
    ) {
        self.templates.insert(key.into(), template.into());
    }

    pub fn has_template(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Renders one failure of `field`.
    ///
    /// An explicit `message` on the rule wins over the locale's template.
    pub fn translate(&self, field: &str, error: &ValidationError) -> String {
        let template: &str = match &error.message {
            Some(message) => &**message,
            None => self.template_for(error),
        };

        render(template, field, error)
    }

    fn template_for(&self, error: &ValidationError) -> &str {
        let code: &str = &error.code;

        let variant = match code {
            "length" => variant_suffix(error, true).map(|suffix| format!("length.{suffix}")),
            "range" => variant_suffix(error, false).map(|suffix| format!("range.{suffix}")),
            _ => None,
        };

        variant
            .and_then(|key| self.templates.get(key.as_str()))
            .or_else(|| self.templates.get(code))
            .map(|template| &**template)
            .unwrap_or(self.fallback)
    }
}

fn variant_suffix(error: &ValidationError, allow_equal: bool) -> Option<&'static str> {
    let has = |name: &str| error.params.get(name).is_some_and(|value| !value.is_null());

    if allow_equal && has("equal") {
        return Some("equal");
    }

    let min = has("min") || has("exclusive_min");
    let max = has("max") || has("exclusive_max");

    match (min, max) {
        (true, true) => Some("between"),
        (true, false) => Some("min"),
        (false, true) => Some("max"),
        (false, false) => None,
    }
}

fn render(template: &str, field: &str, error: &ValidationError) -> String {
    let mut out = template
        .replace("{field}", field)
        .replace("{code}", &error.code);

    // Exclusive bounds stand in for missing inclusive ones.
    for (name, exclusive) in [("min", "exclusive_min"), ("max", "exclusive_max")] {
        if !error.params.contains_key(name)
            && let Some(value) = error.params.get(exclusive)
        {
            out = out.replace(&format!("{{{name}}}"), &param_text(value));
        }
    }

    for (name, value) in &error.params {
        let placeholder = format!("{{{name}}}");
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, &param_text(value));
        }
    }

    out.trim().to_string()
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
