//! Endpoint class generation
//!
//! One URL path becomes one class. Its namespace comes from the directory
//! part of the path with placeholders removed, its name from the last literal
//! segment, and it gets one method per supported verb.
//!
//! `/foo/{foo_id}/bar/{bar_id}` becomes class `Bar` in namespace `<base>::foo`
//! with methods such as `getByFooAndBar`.

use once_cell::sync::Lazy;
use openapiv3::{
    MediaType, OpenAPI, Operation, Parameter, ParameterData, ParameterSchemaOrContent, PathItem,
    ReferenceOr, RequestBody, Response, StatusCode,
};
use regex::Regex;

use super::errors::GenerationError;
use super::sanitizers::Sanitize;
use super::type_map::TypeMap;
use super::types::{
    ClassKind, ClassName, GeneratedClass, GeneratedMethod, HttpVerb, Instantiation,
    MethodParameter, Namespace, ParameterLocation, ReturnType, Statement, Throws,
};
use super::utils::to_proper_case;

/// IR name of the request body parameter
pub const REQUEST_BODY: &str = "requestBody";

const PARAMETERS_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODIES_PREFIX: &str = "#/components/requestBodies/";
const RESPONSES_PREFIX: &str = "#/components/responses/";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"));

/// Builds endpoint classes for the paths of one document
pub struct EndpointGenerator<'a> {
    spec: &'a OpenAPI,
    sanitize: &'a Sanitize,
    base_namespace: &'a Namespace,
    base_type: &'a str,
    verbs: &'a [HttpVerb],
    content_type: &'a str,
}

impl<'a> EndpointGenerator<'a> {
    pub fn new(
        spec: &'a OpenAPI,
        sanitize: &'a Sanitize,
        base_namespace: &'a Namespace,
        base_type: &'a str,
        verbs: &'a [HttpVerb],
        content_type: &'a str,
    ) -> Self {
        Self {
            spec,
            sanitize,
            base_namespace,
            base_type,
            verbs,
            content_type,
        }
    }

    /// Generates the class for one path.
    ///
    /// The first operation that fails aborts the whole class; the error is
    /// prefixed with the verb and path. Verbs outside the supported set are
    /// skipped silently.
    pub fn generate(
        &self,
        url: &str,
        item: &PathItem,
        type_map: &mut TypeMap,
    ) -> Result<GeneratedClass, GenerationError> {
        let segments = normalize_path(self.sanitize, url);
        let Some((short_name, dirs)) = segments.split_last() else {
            return Err(GenerationError::schema(format!(
                "cannot derive a class name from path `{url}`"
            )));
        };
        let modules: Vec<String> = dirs.iter().map(|d| self.sanitize.module_name(d)).collect();
        let name = ClassName::new(self.base_namespace.join(&modules), short_name.clone());

        let mut class = GeneratedClass::new(
            name,
            ClassKind::Endpoint {
                url: url.to_string(),
            },
            url,
        );
        class.base_type = Some(self.base_type.to_string());
        class.description = self
            .sanitize
            .description(item.description.as_deref().or(item.summary.as_deref()));

        let suffix = operation_suffix(url);
        for verb in self.verbs {
            let Some(operation) = verb.operation(item) else {
                continue;
            };
            tracing::debug!(verb = %verb, path = %url, "Mapping operation");

            let method = self
                .method(*verb, item, operation, &suffix, &mut class, type_map)
                .map_err(|e| e.at(&format!("{verb} {url}")))?;
            class.add_method(method);
        }

        Ok(class)
    }

    fn method(
        &self,
        verb: HttpVerb,
        item: &PathItem,
        operation: &Operation,
        suffix: &str,
        class: &mut GeneratedClass,
        type_map: &mut TypeMap,
    ) -> Result<GeneratedMethod, GenerationError> {
        let mut params = self.parameters(item, operation, type_map)?;
        let path_count = count_in(&params, ParameterLocation::Path);
        let query_count = count_in(&params, ParameterLocation::Query);

        let request_body = self.request_body(operation, type_map)?;
        let return_type = self.return_type(operation, type_map)?;

        if let Some(body) = request_body {
            if params
                .iter()
                .any(|p| p.name == body.name || p.field_name == body.field_name)
            {
                return Err(GenerationError::generator(
                    "requestBody already exists as path or query parameter",
                ));
            }
            params.push(body);
        }

        for param in &params {
            class.add_uses_of(&param.ty);
        }
        if let Some(ty) = &return_type.ty {
            class.add_uses_of(ty);
        }

        let mut statements: Vec<Statement> = params
            .iter()
            .filter(|p| p.required)
            .map(|p| Statement::RequireArgument {
                parameter: p.name.clone(),
            })
            .collect();
        let throws = if statements.is_empty() {
            Vec::new()
        } else {
            vec![Throws {
                error: "ClientError::Argument".to_string(),
                description: "if required parameters are not defined".to_string(),
            }]
        };

        statements.push(Statement::Dispatch {
            verb,
            path: names_in(&params, ParameterLocation::Path),
            query: names_in(&params, ParameterLocation::Query),
            body: params
                .iter()
                .find(|p| p.location == ParameterLocation::Body)
                .map(|p| p.name.clone()),
        });
        statements.push(Statement::Return {
            instantiation: return_type.instantiation.clone(),
        });

        Ok(GeneratedMethod {
            name: method_name(verb, path_count, query_count, suffix),
            verb,
            params,
            return_type,
            statements,
            throws,
            description: self.sanitize.description(
                operation
                    .description
                    .as_deref()
                    .or(operation.summary.as_deref()),
            ),
        })
    }

    /// Path and query parameters, path-level first. An operation-level
    /// parameter replaces a path-level one with the same name and location.
    fn parameters(
        &self,
        item: &PathItem,
        operation: &Operation,
        type_map: &mut TypeMap,
    ) -> Result<Vec<MethodParameter>, GenerationError> {
        let mut merged: Vec<(&ParameterData, ParameterLocation)> = Vec::new();
        for parameter in item.parameters.iter().chain(operation.parameters.iter()) {
            let parameter = resolve_component(parameter, PARAMETERS_PREFIX, |name| {
                self.spec
                    .components
                    .as_ref()
                    .and_then(|c| c.parameters.get(name))
            })?;
            let (data, location) = match parameter {
                Parameter::Path { parameter_data, .. } => (parameter_data, ParameterLocation::Path),
                Parameter::Query { parameter_data, .. } => {
                    (parameter_data, ParameterLocation::Query)
                }
                Parameter::Header { .. } | Parameter::Cookie { .. } => continue,
            };
            match merged
                .iter_mut()
                .find(|(d, l)| d.name == data.name && *l == location)
            {
                Some(existing) => *existing = (data, location),
                None => merged.push((data, location)),
            }
        }

        let mut params: Vec<MethodParameter> = Vec::with_capacity(merged.len());
        for (data, location) in merged {
            let ty = match &data.format {
                ParameterSchemaOrContent::Schema(schema) => type_map
                    .type_from_schema(schema)
                    .map_err(|e| e.at(&format!("parameter `{}`", data.name)))?,
                ParameterSchemaOrContent::Content(_) => {
                    return Err(GenerationError::schema(format!(
                        "no schema provided for parameter `{}`",
                        data.name
                    )));
                }
            };

            let field_name = self.sanitize.field_name(&data.name);
            if params
                .iter()
                .any(|p| p.name == data.name || p.field_name == field_name)
            {
                return Err(GenerationError::generator(format!(
                    "parameter `{}` appears more than once",
                    data.name
                )));
            }

            let description = self.sanitize.description(data.description.as_deref());
            params.push(MethodParameter {
                name: data.name.clone(),
                field_name,
                location,
                ty,
                required: data.required,
                description: if data.required {
                    description
                } else {
                    Some(format!("(Optional) {}", description.unwrap_or_default()))
                        .map(|d| d.trim_end().to_string())
                },
            });
        }

        Ok(params)
    }

    fn request_body(
        &self,
        operation: &Operation,
        type_map: &mut TypeMap,
    ) -> Result<Option<MethodParameter>, GenerationError> {
        let Some(body) = &operation.request_body else {
            return Ok(None);
        };
        let body: &RequestBody = resolve_component(body, REQUEST_BODIES_PREFIX, |name| {
            self.spec
                .components
                .as_ref()
                .and_then(|c| c.request_bodies.get(name))
        })?;

        let media = media_for(&body.content, self.content_type).ok_or_else(|| {
            GenerationError::schema(format!(
                "request body has no `{}` content",
                self.content_type
            ))
        })?;
        let schema = media
            .schema
            .as_ref()
            .ok_or_else(|| GenerationError::schema("missing schema for request body"))?;
        let ty = type_map
            .type_from_schema(schema)
            .map_err(|e| e.at("request body"))?;

        Ok(Some(MethodParameter {
            name: REQUEST_BODY.to_string(),
            field_name: self.sanitize.field_name(REQUEST_BODY),
            location: ParameterLocation::Body,
            ty,
            required: body.required,
            description: self.sanitize.description(body.description.as_deref()),
        }))
    }

    /// The 200 response, else the 201 response, resolved into a return type.
    fn return_type(
        &self,
        operation: &Operation,
        type_map: &mut TypeMap,
    ) -> Result<ReturnType, GenerationError> {
        let responses = &operation.responses.responses;
        let response = responses
            .get(&StatusCode::Code(200))
            .or_else(|| responses.get(&StatusCode::Code(201)))
            .ok_or_else(|| GenerationError::schema("has no OK response"))?;
        let response: &Response = resolve_component(response, RESPONSES_PREFIX, |name| {
            self.spec
                .components
                .as_ref()
                .and_then(|c| c.responses.get(name))
        })?;
        let description = self.sanitize.description(Some(&response.description));

        let Some(media) = media_for(&response.content, self.content_type) else {
            return Ok(ReturnType {
                ty: None,
                instantiation: Instantiation::Void,
                description,
            });
        };
        let schema = media
            .schema
            .as_ref()
            .ok_or_else(|| GenerationError::schema("missing schema for response"))?;
        let ty = type_map
            .type_from_schema(schema)
            .map_err(|e| e.at("response"))?;

        let instantiation = match (schema, &ty) {
            (ReferenceOr::Reference { .. }, _) => match ty.class() {
                Some(class) => Instantiation::Single(class.clone()),
                None => Instantiation::Raw,
            },
            (ReferenceOr::Item(_), _) => match ty
                .element()
                .and_then(|element| type_map.class_from_type(&element.to_string()))
            {
                Some(class) => Instantiation::EachOf(class.clone()),
                None => Instantiation::Raw,
            },
        };

        Ok(ReturnType {
            ty: Some(ty),
            instantiation,
            description,
        })
    }
}

/// Literal path segments as PascalCase identifiers, placeholders dropped.
///
/// `/foo/{foo_id}/bar-baz/{id}` normalizes to `["Foo", "BarBaz"]`.
pub fn normalize_path(sanitize: &Sanitize, url: &str) -> Vec<String> {
    url.split('/')
        .filter(|segment| !segment.is_empty() && !PLACEHOLDER.is_match(segment))
        .map(|segment| sanitize.clean(segment))
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Method name suffix derived from the path's placeholders.
///
/// Each placeholder loses any `_id`, the names are joined with `and`, and the
/// whole thing is prefixed with `by`: `{foo_id}` and `{bar_id}` give
/// `ByFooAndBar`. A path without placeholders gives an empty suffix.
pub fn operation_suffix(url: &str) -> String {
    let names: Vec<String> = PLACEHOLDER
        .captures_iter(url)
        .map(|caps| caps[1].replace("_id", ""))
        .collect();
    if names.is_empty() {
        return String::new();
    }
    to_proper_case(&format!("by_{}", names.join("_and_")))
}

/// IR method name for an operation.
///
/// A `get` without path parameters is a collection read: `getAll` when it
/// takes no query parameters either, `filterBy` when it does.
pub fn method_name(verb: HttpVerb, path_count: usize, query_count: usize, suffix: &str) -> String {
    let base = match verb {
        HttpVerb::Get if path_count == 0 && query_count == 0 => "getAll",
        HttpVerb::Get if path_count == 0 => "filterBy",
        other => other.as_str(),
    };
    format!("{base}{suffix}")
}

/// The media entry for `content_type`, ignoring parameters such as `charset`.
fn media_for<'c>(
    content: &'c indexmap::IndexMap<String, MediaType>,
    content_type: &str,
) -> Option<&'c MediaType> {
    content.get(content_type).or_else(|| {
        content
            .iter()
            .find(|(key, _)| {
                key.split(';')
                    .next()
                    .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(content_type))
            })
            .map(|(_, media)| media)
    })
}

/// Follows one level of `#/components/<kind>/<name>` indirection.
fn resolve_component<'s, T>(
    item: &'s ReferenceOr<T>,
    prefix: &str,
    lookup: impl Fn(&str) -> Option<&'s ReferenceOr<T>>,
) -> Result<&'s T, GenerationError> {
    match item {
        ReferenceOr::Item(value) => Ok(value),
        ReferenceOr::Reference { reference } => {
            let name = reference.strip_prefix(prefix).ok_or_else(|| {
                GenerationError::generator(format!("unsupported reference `{reference}`"))
            })?;
            match lookup(name) {
                Some(ReferenceOr::Item(value)) => Ok(value),
                Some(ReferenceOr::Reference { .. }) => Err(GenerationError::generator(format!(
                    "nested reference `{reference}` is not supported"
                ))),
                None => Err(GenerationError::generator(format!(
                    "could not resolve reference `{reference}`"
                ))),
            }
        }
    }
}

fn count_in(params: &[MethodParameter], location: ParameterLocation) -> usize {
    params.iter().filter(|p| p.location == location).count()
}

fn names_in(params: &[MethodParameter], location: ParameterLocation) -> Vec<String> {
    params
        .iter()
        .filter(|p| p.location == location)
        .map(|p| p.name.clone())
        .collect()
}
