use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::{CheckError, CustomRule, Describe, FieldNames, Locale, NameSource, Translator};

/// Validator plus translator for one locale.
///
/// Built once at startup and shared behind an `Arc`. Field-name mappings are
/// resolved the first time a type is checked and cached afterwards.
#[derive(Debug)]
pub struct ValidationEngine {
    translator: Translator,
    sources: Vec<NameSource>,
    names: RwLock<HashMap<TypeId, Arc<FieldNames>>>,
}

impl ValidationEngine {
    pub fn builder(locale: Locale) -> ValidationEngineBuilder {
        ValidationEngineBuilder {
            locale,
            rules: Vec::new(),
            sources: FieldNames::DEFAULT_ORDER.to_vec(),
        }
    }

    pub fn locale(&self) -> Locale {
        self.translator.locale()
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Runs every rule of `input` and reports all failures at once.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Fields`] with one translated sentence per failed
    /// rule, joined by `;`, in field declaration order.
    pub fn check_struct<T>(&self, input: &T) -> Result<(), CheckError>
    where
        T: Validate + Describe + 'static,
    {
        let Err(errors) = input.validate() else {
            return Ok(());
        };

        let names = self.field_names::<T>();
        let mut sentences = Vec::new();
        self.collect(&errors, Some(&names), "", &mut sentences);

        if sentences.is_empty() {
            return Ok(());
        }

        Err(CheckError::Fields(sentences.join(";")))
    }

    /// Binds a raw JSON value to `T` and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InvalidInput`] if `value` is not a JSON object or
    /// does not fit `T`, and the errors of [`Self::check_struct`] otherwise.
    pub fn check_value<T>(&self, value: &Value) -> Result<(), CheckError>
    where
        T: DeserializeOwned + Validate + Describe + 'static,
    {
        if !value.is_object() {
            tracing::debug!(kind = json_kind(value), "Validation input is not an object");
            return Err(CheckError::InvalidInput);
        }

        let input = T::deserialize(value).map_err(|err| {
            tracing::debug!(error = %err, "Validation input does not bind");
            CheckError::InvalidInput
        })?;

        self.check_struct(&input)
    }

    fn field_names<T: Describe + 'static>(&self) -> Arc<FieldNames> {
        let key = TypeId::of::<T>();

        if let Some(names) = self
            .names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(names);
        }

        let mut cache = self.names.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            cache
                .entry(key)
                .or_insert_with(|| Arc::new(FieldNames::build(T::fields(), &self.sources))),
        )
    }

    fn collect(
        &self,
        errors: &ValidationErrors,
        names: Option<&FieldNames>,
        prefix: &str,
        out: &mut Vec<String>,
    ) {
        let mut entries: Vec<_> = errors.errors().iter().collect();
        entries.sort_by(|(a, _), (b, _)| {
            declared_position(names, a)
                .cmp(&declared_position(names, b))
                .then_with(|| a.cmp(b))
        });

        for (field, kind) in entries {
            let label = match names {
                Some(names) => names.display(field).into_owned(),
                None => field.to_string(),
            };
            let path = join_path(prefix, &label);

            match kind {
                ValidationErrorsKind::Field(failures) => {
                    for failure in failures {
                        out.push(self.translator.translate(&path, failure));
                    }
                }
                ValidationErrorsKind::Struct(inner) => {
                    let nested = names.and_then(|names| names.nested(field));
                    self.collect(inner, nested.as_deref(), &path, out);
                }
                ValidationErrorsKind::List(items) => {
                    let nested = names.and_then(|names| names.nested(field));
                    for (index, inner) in items {
                        self.collect(inner, nested.as_deref(), &format!("{path}[{index}]"), out);
                    }
                }
            }
        }
    }
}

fn declared_position(names: Option<&FieldNames>, field: &str) -> usize {
    names
        .and_then(|names| names.position(field))
        .unwrap_or(usize::MAX)
}

fn join_path(prefix: &str, field: &str) -> String {
    match (prefix.is_empty(), field.is_empty()) {
        (true, _) => field.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}.{field}"),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Configuration of a [`ValidationEngine`].
#[derive(Debug, Clone)]
pub struct ValidationEngineBuilder {
    locale: Locale,
    rules: Vec<CustomRule>,
    sources: Vec<NameSource>,
}

impl ValidationEngineBuilder {
    /// Registers a custom rule. Later rules override earlier ones with the same code.
    pub fn rule(mut self, rule: CustomRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = CustomRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Replaces the order in which display-name sources are consulted.
    pub fn name_sources(mut self, sources: impl Into<Vec<NameSource>>) -> Self {
        self.sources = sources.into();
        self
    }

    pub fn build(self) -> ValidationEngine {
        let mut translator = Translator::new(self.locale);

        for rule in std::iter::once(CustomRule::phone()).chain(self.rules) {
            match rule.template(self.locale) {
                Some(template) => translator.register(rule.code.clone(), template.clone()),
                None => tracing::warn!(
                    rule = %rule.code,
                    locale = %self.locale,
                    "Custom rule has no message template, using the default one"
                ),
            }
        }

        tracing::debug!(locale = %self.locale, "Validation engine built");

        ValidationEngine {
            translator,
            sources: self.sources,
            names: RwLock::new(HashMap::new()),
        }
    }
}

/// Holder that builds its [`ValidationEngine`] on the first [`init`](Self::init).
///
/// Every later call, including concurrent ones, gets the same engine. Their
/// arguments are ignored; a different locale is reported at `warn` level.
#[derive(Debug, Default)]
pub struct ValidationCell {
    engine: OnceLock<Arc<ValidationEngine>>,
}

impl ValidationCell {
    pub const fn new() -> Self {
        Self {
            engine: OnceLock::new(),
        }
    }

    /// Returns the engine, building it from `locale` and `rules` on the first call.
    pub fn init(
        &self,
        locale: &str,
        rules: impl IntoIterator<Item = CustomRule>,
    ) -> Arc<ValidationEngine> {
        let requested = Locale::resolve(locale);

        let engine = self.engine.get_or_init(|| {
            Arc::new(ValidationEngine::builder(requested).rules(rules).build())
        });

        if engine.locale() != requested {
            tracing::warn!(
                requested = %requested,
                active = %engine.locale(),
                "Validation engine already initialized, ignoring new arguments"
            );
        }

        Arc::clone(engine)
    }

    pub fn get(&self) -> Option<Arc<ValidationEngine>> {
        self.engine.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldMeta, validate_phone};
    use serde::Deserialize;
    use serde_json::json;
    use std::thread;
    use validator::ValidationError;

    #[derive(Debug, Deserialize, Validate)]
    struct Contact {
        #[validate(length(min = 1))]
        name: String,
        #[validate(custom(function = "validate_phone"))]
        phone: String,
    }

    impl Describe for Contact {
        fn fields() -> &'static [FieldMeta] {
            const FIELDS: &[FieldMeta] = &[
                FieldMeta::new("name").label("姓名").wire("name"),
                FieldMeta::new("phone").label("手机号码").wire("phone"),
            ];
            FIELDS
        }
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Team {
        #[validate(length(min = 2, max = 20))]
        title: String,
        #[validate(nested)]
        members: Vec<Contact>,
    }

    impl Describe for Team {
        fn fields() -> &'static [FieldMeta] {
            const FIELDS: &[FieldMeta] = &[
                FieldMeta::new("title").wire("title"),
                FieldMeta::new("members").wire("members").nested(Contact::fields),
            ];
            FIELDS
        }
    }

    fn validate_slug(value: &str) -> Result<(), ValidationError> {
        if value.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
            Ok(())
        } else {
            Err(ValidationError::new("slug"))
        }
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Page {
        #[validate(custom(function = "validate_slug"))]
        path: String,
    }

    impl Describe for Page {
        fn fields() -> &'static [FieldMeta] {
            const FIELDS: &[FieldMeta] = &[FieldMeta::new("path")];
            FIELDS
        }
    }

    fn contact(name: &str, phone: &str) -> Contact {
        Contact {
            name: name.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_valid_struct_passes() {
        let engine = ValidationEngine::builder(Locale::Zh).build();
        assert!(engine.check_struct(&contact("张三", "13800000000")).is_ok());
    }

    #[test]
    fn test_phone_failure_zh() {
        let engine = ValidationEngine::builder(Locale::Zh).build();

        let err = engine.check_struct(&contact("张三", "12345")).unwrap_err();

        assert_eq!(
            err,
            CheckError::Fields("手机号码必须是一个有效的手机号码".to_string())
        );
    }

    #[test]
    fn test_all_failures_joined_in_declaration_order() {
        let engine = ValidationEngine::builder(Locale::En).build();

        let err = engine.check_struct(&contact("", "12345")).unwrap_err();

        assert_eq!(
            err.to_string(),
            "姓名 must be at least 1 characters in length;手机号码 must be a valid phone number"
        );
    }

    #[test]
    fn test_nested_list_paths() {
        let engine = ValidationEngine::builder(Locale::En).build();
        let team = Team {
            title: "x".to_string(),
            members: vec![contact("a", "13800000000"), contact("b", "123")],
        };

        let err = engine.check_struct(&team).unwrap_err();

        assert_eq!(
            err.to_string(),
            "title must be between 2 and 20 characters in length;members[1].手机号码 must be a valid phone number"
        );
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Booking {
        #[validate(nested)]
        contact: Contact,
    }

    impl Describe for Booking {
        fn fields() -> &'static [FieldMeta] {
            const FIELDS: &[FieldMeta] = &[FieldMeta::new("contact")
                .label("联系人")
                .wire("contact")
                .nested(Contact::fields)];
            FIELDS
        }
    }

    #[test]
    fn test_nested_struct_uses_inner_labels() {
        let engine = ValidationEngine::builder(Locale::Zh).build();

        let err = engine
            .check_struct(&Booking {
                contact: contact("张三", "1"),
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "联系人.手机号码必须是一个有效的手机号码");
    }

    #[test]
    fn test_custom_rule_message() {
        let engine = ValidationEngine::builder(Locale::En)
            .rule(CustomRule::new("slug").message(Locale::En, "{field} must be a lowercase slug"))
            .build();

        let err = engine
            .check_struct(&Page {
                path: "Not A Slug".to_string(),
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "path must be a lowercase slug");
    }

    #[test]
    fn test_unregistered_custom_rule_uses_fallback() {
        let engine = ValidationEngine::builder(Locale::Zh).build();

        let err = engine
            .check_struct(&Page {
                path: "Bad".to_string(),
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "path未通过slug校验");
    }

    #[test]
    fn test_name_sources_override() {
        let engine = ValidationEngine::builder(Locale::En)
            .name_sources([NameSource::Wire, NameSource::Declared])
            .build();

        let err = engine.check_struct(&contact("ok", "1")).unwrap_err();

        assert_eq!(err.to_string(), "phone must be a valid phone number");
    }

    #[test]
    fn test_check_value_rejects_non_objects() {
        let engine = ValidationEngine::builder(Locale::Zh).build();

        for value in [json!(42), json!("text"), json!([1, 2]), json!(null)] {
            assert_eq!(
                engine.check_value::<Contact>(&value),
                Err(CheckError::InvalidInput)
            );
        }
    }

    #[test]
    fn test_check_value_binds_and_validates() {
        let engine = ValidationEngine::builder(Locale::Zh).build();

        assert!(
            engine
                .check_value::<Contact>(&json!({"name": "李四", "phone": "13912345678"}))
                .is_ok()
        );

        let err = engine
            .check_value::<Contact>(&json!({"name": "李四", "phone": "1391234"}))
            .unwrap_err();
        assert!(matches!(err, CheckError::Fields(_)));
        assert_ne!(err, CheckError::InvalidInput);

        assert_eq!(
            engine.check_value::<Contact>(&json!({"name": 1})),
            Err(CheckError::InvalidInput)
        );
    }

    #[test]
    fn test_field_names_cached_per_type() {
        let engine = ValidationEngine::builder(Locale::Zh).build();

        let first = engine.field_names::<Contact>();
        let second = engine.field_names::<Contact>();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cell_first_call_wins() {
        let cell = ValidationCell::new();
        assert!(cell.get().is_none());

        let first = cell.init("en", []);
        let second = cell.init("zh", [CustomRule::new("slug")]);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.locale(), Locale::En);
        assert!(!second.translator().has_template("slug"));
    }

    #[test]
    fn test_cell_unknown_locale_defaults_to_zh() {
        let cell = ValidationCell::new();
        assert_eq!(cell.init("de", []).locale(), Locale::Zh);
    }

    #[test]
    fn test_cell_concurrent_init_builds_once() {
        let cell = ValidationCell::new();

        let engines: Vec<Arc<ValidationEngine>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let cell = &cell;
                    scope.spawn(move || cell.init(if i % 2 == 0 { "zh" } else { "en" }, []))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let first = cell.get().unwrap();
        assert!(engines.iter().all(|engine| Arc::ptr_eq(engine, &first)));
    }
}
