//! Intermediate representation of generated classes
//!
//! Generators build these values; the rendering pass turns them into source
//! text. Nothing in here knows about templates.

use indexmap::IndexSet;
use openapiv3::{Operation, PathItem};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::type_map::ResolvedType;

/// A `::`-separated module path, stored as its segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct Namespace(Vec<String>);

impl Namespace {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Splits `a::b::c`, ignoring empty segments and surrounding colons.
    pub fn parse(path: &str) -> Self {
        Self(
            path.split("::")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn join(&self, other: &[String]) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.iter().cloned());
        Self(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        self.0.split_last().map(|(_, rest)| Self(rest.to_vec()))
    }

    /// The segments below `base`, or `None` if this namespace is not inside it.
    pub fn relative_to(&self, base: &Namespace) -> Option<&[String]> {
        self.0.strip_prefix(base.0.as_slice())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("::"))
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.to_string()
    }
}

/// Fully-qualified name of a generated class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassName {
    pub namespace: Namespace,
    pub short_name: String,
}

impl ClassName {
    pub fn new(namespace: Namespace, short_name: impl Into<String>) -> Self {
        Self {
            namespace,
            short_name: short_name.into(),
        }
    }

    /// Absolute path from the consuming crate's root, e.g. `crate::api::models::Pet`
    pub fn crate_path(&self) -> String {
        format!("crate::{self}")
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.short_name)
        } else {
            write!(f, "{}::{}", self.namespace, self.short_name)
        }
    }
}

/// HTTP verbs an endpoint class can expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    pub const ALL: [HttpVerb; 5] = [
        HttpVerb::Get,
        HttpVerb::Post,
        HttpVerb::Put,
        HttpVerb::Patch,
        HttpVerb::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Put => "put",
            HttpVerb::Patch => "patch",
            HttpVerb::Delete => "delete",
        }
    }

    /// Variant name of the runtime's `Verb` enum
    pub fn variant(&self) -> &'static str {
        match self {
            HttpVerb::Get => "Get",
            HttpVerb::Post => "Post",
            HttpVerb::Put => "Put",
            HttpVerb::Patch => "Patch",
            HttpVerb::Delete => "Delete",
        }
    }

    /// The operation a path item declares for this verb, if any
    pub fn operation<'a>(&self, item: &'a PathItem) -> Option<&'a Operation> {
        match self {
            HttpVerb::Get => item.get.as_ref(),
            HttpVerb::Post => item.post.as_ref(),
            HttpVerb::Put => item.put.as_ref(),
            HttpVerb::Patch => item.patch.as_ref(),
            HttpVerb::Delete => item.delete.as_ref(),
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// A generated class: one endpoint struct or one model type
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedClass {
    pub name: ClassName,
    pub kind: ClassKind,
    /// Type the class wraps (endpoints only)
    pub base_type: Option<String>,
    pub description: Option<String>,
    pub properties: Vec<ClassProperty>,
    pub methods: Vec<GeneratedMethod>,
    /// Other generated classes this one refers to
    pub uses: IndexSet<ClassName>,
    /// Where in the document the class came from, e.g. `/pets/{id}`
    pub source: String,
}

impl GeneratedClass {
    pub fn new(name: ClassName, kind: ClassKind, source: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            base_type: None,
            description: None,
            properties: Vec::new(),
            methods: Vec::new(),
            uses: IndexSet::new(),
            source: source.into(),
        }
    }

    /// Records an import. A class never imports itself.
    pub fn add_use(&mut self, class: &ClassName) {
        if *class != self.name {
            self.uses.insert(class.clone());
        }
    }

    /// Records imports for every class mentioned by `ty`.
    pub fn add_uses_of(&mut self, ty: &ResolvedType) {
        for class in ty.classes() {
            self.add_use(class);
        }
    }

    pub fn add_method(&mut self, method: GeneratedMethod) {
        self.methods.push(method);
    }

    pub fn method(&self, name: &str) -> Option<&GeneratedMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn qualified_name(&self) -> String {
        self.name.to_string()
    }

    /// URL pattern of an endpoint class
    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            ClassKind::Endpoint { url } => Some(url),
            ClassKind::Model(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassKind {
    Endpoint { url: String },
    Model(ModelShape),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "target", rename_all = "snake_case")]
pub enum ModelShape {
    /// A struct whose fields are the class properties
    Struct,
    /// A type alias for a scalar, array or other class
    Alias(ResolvedType),
}

/// A field of a model struct
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProperty {
    /// Rust field name
    pub name: String,
    /// Name on the wire
    pub wire_name: String,
    pub ty: ResolvedType,
    pub required: bool,
    /// Self-referential fields are boxed
    pub boxed: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodParameter {
    /// Name as it appears in the document (`requestBody` for bodies)
    pub name: String,
    /// Rust identifier for the field holding the argument
    pub field_name: String,
    pub location: ParameterLocation,
    pub ty: ResolvedType,
    pub required: bool,
    pub description: Option<String>,
}

/// How the raw decoded response becomes the method's return value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "class", rename_all = "snake_case")]
pub enum Instantiation {
    /// Returned as decoded
    Raw,
    /// One instance built from the whole body
    Single(ClassName),
    /// One instance per array element, order preserved
    EachOf(ClassName),
    /// No content for the expected media type
    Void,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnType {
    /// `None` when the method returns nothing
    pub ty: Option<ResolvedType>,
    pub instantiation: Instantiation,
    pub description: Option<String>,
}

/// Error a method can raise, with the condition that raises it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Throws {
    pub error: String,
    pub description: String,
}

/// One step of a generated method body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// Fail with an argument error if the parameter is missing
    RequireArgument { parameter: String },
    /// Call the runtime dispatch primitive
    Dispatch {
        verb: HttpVerb,
        path: Vec<String>,
        query: Vec<String>,
        body: Option<String>,
    },
    /// Wrap the dispatch result and return it
    Return { instantiation: Instantiation },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedMethod {
    pub name: String,
    pub verb: HttpVerb,
    pub params: Vec<MethodParameter>,
    pub return_type: ReturnType,
    pub statements: Vec<Statement>,
    pub throws: Vec<Throws>,
    pub description: Option<String>,
}

impl GeneratedMethod {
    pub fn param(&self, name: &str) -> Option<&MethodParameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn params_in(&self, location: ParameterLocation) -> impl Iterator<Item = &MethodParameter> {
        self.params.iter().filter(move |p| p.location == location)
    }
}

/// A rendered file ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}
