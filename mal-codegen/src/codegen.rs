use std::collections::HashSet;

use heck::{CamelCase, SnakeCase};
use proc_macro2::{Ident, TokenStream};

use crate::{
    error::{Error, Result},
    repr::{Area, Composite, Enumeration, Model, Operation, Service, Type},
    templates::{
        DataField, DataType, EnumVariant, ErrorCode, RustTemplates, ServiceNames, Signature,
        Templates,
    },
};

pub const MIN_WRAP_WIDTH: usize = 60;
pub const MAX_WRAP_WIDTH: usize = 64;

#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Width comments are wrapped to, clamped to `MIN_WRAP_WIDTH..=MAX_WRAP_WIDTH`
    pub wrap_width: usize,

    /// Whether to emit leading comment blocks
    pub emit_docs: bool,
}

impl SynthConfig {
    pub fn line_width(&self) -> usize {
        self.wrap_width.max(MIN_WRAP_WIDTH).min(MAX_WRAP_WIDTH)
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self { wrap_width: MIN_WRAP_WIDTH, emit_docs: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Area scoped composites and enumerations
    AreaData,
    Constants,
    ServiceDeclaration,
    Constructor,
    ConsumerOperation(String),
    Provider,
    Data,
    Errors,
    Tests,
}

impl ArtifactKind {
    /// The directory of the generated service package this artifact belongs in
    pub fn directory(&self) -> &'static str {
        match self {
            ArtifactKind::AreaData | ArtifactKind::Data => "data",
            ArtifactKind::Constants => "constants",
            ArtifactKind::ServiceDeclaration | ArtifactKind::Constructor => "service",
            ArtifactKind::ConsumerOperation(_) => "consumer",
            ArtifactKind::Provider => "provider",
            ArtifactKind::Errors => "errors",
            ArtifactKind::Tests => "tests",
        }
    }

    pub fn file_stem(&self) -> String {
        match self {
            ArtifactKind::AreaData | ArtifactKind::Data => "data".into(),
            ArtifactKind::Constants => "constants".into(),
            ArtifactKind::ServiceDeclaration => "service".into(),
            ArtifactKind::Constructor => "constructor".into(),
            ArtifactKind::ConsumerOperation(operation) => operation.to_snake_case(),
            ArtifactKind::Provider => "provider".into(),
            ArtifactKind::Errors => "errors".into(),
            ArtifactKind::Tests => "tests".into(),
        }
    }
}

/// One unit of generated output
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: ArtifactKind,

    /// The service the artifact was generated for, or the area name for `AreaData`
    pub service: String,

    pub text: String,
}

pub struct Synthesizer<T = RustTemplates> {
    config: SynthConfig,
    templates: T,
}

impl Synthesizer<RustTemplates> {
    pub fn new(config: SynthConfig) -> Self {
        Self::with_templates(config, RustTemplates)
    }
}

impl<T: Templates> Synthesizer<T> {
    pub fn with_templates(config: SynthConfig, templates: T) -> Self {
        Self { config, templates }
    }

    pub fn synthesize(&self, model: &Model) -> Result<Vec<Artifact>> {
        let mut artifacts = vec![];

        for area in &model.areas {
            artifacts.push(self.area_data(area)?);

            for service in &area.services {
                artifacts.push(self.constants(area, service)?);
                artifacts.push(self.service_declaration(area, service)?);
                artifacts.push(self.constructor(area, service)?);
                for operation in &service.operations {
                    artifacts.push(self.consumer_operation(area, service, operation)?);
                }
                artifacts.push(self.provider(area, service)?);
                artifacts.push(self.data(area, service)?);
                artifacts.push(self.errors(area, service)?);
                artifacts.push(self.tests(area, service)?);
            }
        }

        Ok(artifacts)
    }

    pub fn area_data(&self, area: &Area) -> Result<Artifact> {
        let types = self.data_types(&area.composites, &area.enumerations, |base| {
            area.is_abstract_base(None, base)
        })?;
        let code = self.templates.data_types(&types);
        Ok(artifact(ArtifactKind::AreaData, &area.name, code))
    }

    pub fn constants(&self, area: &Area, service: &Service) -> Result<Artifact> {
        let names = self.service_names(area, service)?;
        let signatures = self.signatures(service)?;
        let code = self.templates.constants(&names, &signatures);
        Ok(artifact(ArtifactKind::Constants, &service.name, code))
    }

    pub fn service_declaration(&self, area: &Area, service: &Service) -> Result<Artifact> {
        let names = self.service_names(area, service)?;
        let code = self.templates.service_declaration(&names);
        Ok(artifact(ArtifactKind::ServiceDeclaration, &service.name, code))
    }

    pub fn constructor(&self, area: &Area, service: &Service) -> Result<Artifact> {
        let names = self.service_names(area, service)?;
        let code = self.templates.constructor(&names);
        Ok(artifact(ArtifactKind::Constructor, &service.name, code))
    }

    pub fn consumer_operation(
        &self,
        area: &Area,
        service: &Service,
        operation: &Operation,
    ) -> Result<Artifact> {
        let names = self.service_names(area, service)?;
        let signature = self.signature(service, operation)?;
        let code = self.templates.consumer_operation(&names, &signature);
        let kind = ArtifactKind::ConsumerOperation(operation.name.clone());
        Ok(artifact(kind, &service.name, code))
    }

    pub fn provider(&self, area: &Area, service: &Service) -> Result<Artifact> {
        let names = self.service_names(area, service)?;
        let signatures = self.signatures(service)?;
        let code = self.templates.provider(&names, &signatures);
        Ok(artifact(ArtifactKind::Provider, &service.name, code))
    }

    /// Service scoped composites and enumerations. Abstract bases resolve against the service,
    /// then its area.
    pub fn data(&self, area: &Area, service: &Service) -> Result<Artifact> {
        let types = self.data_types(&service.composites, &service.enumerations, |base| {
            area.is_abstract_base(Some(service), base)
        })?;
        let code = self.templates.data_types(&types);
        Ok(artifact(ArtifactKind::Data, &service.name, code))
    }

    pub fn errors(&self, area: &Area, service: &Service) -> Result<Artifact> {
        let mut errors = vec![];
        for error in &area.errors {
            errors.push(ErrorCode {
                ident: ident(&format!("ERROR_{}", error.name.to_uppercase()))?,
                number: error.number,
                doc: self.doc(&error.comment),
            });
        }
        let code = self.templates.errors(&errors);
        Ok(artifact(ArtifactKind::Errors, &service.name, code))
    }

    pub fn tests(&self, area: &Area, service: &Service) -> Result<Artifact> {
        let names = self.service_names(area, service)?;
        let signatures = self.signatures(service)?;
        let code = self.templates.tests(&names, &signatures);
        Ok(artifact(ArtifactKind::Tests, &service.name, code))
    }

    fn service_names(&self, area: &Area, service: &Service) -> Result<ServiceNames> {
        let prefix = format!("{}_SERVICE", service.name.to_uppercase());
        let camel = service.name.to_camel_case();

        Ok(ServiceNames {
            area: area.name.clone(),
            area_number: area.number,
            area_version: area.version,
            service: service.name.clone(),
            service_number: service.number,
            service_type: ident(&format!("{}Service", camel))?,
            provider_type: ident(&format!("{}Provider", camel))?,
            area_identifier_const: ident(&format!("{}_AREA_IDENTIFIER", prefix))?,
            service_identifier_const: ident(&format!("{}_SERVICE_IDENTIFIER", prefix))?,
            area_number_const: ident(&format!("{}_AREA_NUMBER", prefix))?,
            service_number_const: ident(&format!("{}_SERVICE_NUMBER", prefix))?,
            area_version_const: ident(&format!("{}_AREA_VERSION", prefix))?,
            doc: self.doc(&service.comment),
        })
    }

    fn signatures(&self, service: &Service) -> Result<Vec<Signature>> {
        service.operations.iter().map(|op| self.signature(service, op)).collect()
    }

    /// Parameters come from the message that opens the interaction and results from the message
    /// that completes it
    pub fn signature(&self, service: &Service, operation: &Operation) -> Result<Signature> {
        let pattern = &operation.pattern;
        let (input, output) = match (pattern.input(), pattern.output()) {
            (Some(input), Some(output)) => (input, output),
            _ => {
                return Err(Error::MissingPatternMessages {
                    service: service.name.clone(),
                    operation: operation.name.clone(),
                })
            }
        };

        let mut param_names = HashSet::new();
        let mut params = vec![];
        for ty in &input.types {
            let base = ty.adapt_type().to_snake_case();
            let mut name = base.clone();
            let mut suffix = 1;
            while !param_names.insert(name.clone()) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            params.push((field_ident(&name)?, type_ident(ty)?));
        }

        let results = output.types.iter().map(type_ident).collect::<Result<Vec<_>>>()?;

        Ok(Signature {
            operation: operation.name.clone(),
            number: operation.number,
            kind: pattern.kind,
            ident: ident(&operation.name.to_camel_case())?,
            test_ident: field_ident(&operation.name)?,
            number_const: ident(&format!("OPERATION_IDENTIFIER_{}", operation.name.to_uppercase()))?,
            params,
            results,
            doc: self.doc(&operation.comment),
        })
    }

    fn data_types(
        &self,
        composites: &[Composite],
        enumerations: &[Enumeration],
        is_abstract_base: impl Fn(&Type) -> bool,
    ) -> Result<Vec<DataType>> {
        let mut types = vec![];

        for enumeration in enumerations {
            let mut variants = vec![];
            for item in &enumeration.items {
                variants.push(EnumVariant {
                    ident: ident(&item.value)?,
                    value: item.nvalue,
                    doc: self.doc(&item.comment),
                });
            }
            types.push(DataType::Enum {
                ident: ident(&enumeration.name)?,
                variants,
                doc: self.doc(&enumeration.comment),
            });
        }

        for composite in composites {
            let doc = self.doc(&composite.comment);
            let composite_ident = ident(&composite.name)?;

            if composite.is_abstract() {
                types.push(DataType::Abstract { ident: composite_ident, doc });
                continue;
            }

            let mut fields = vec![];
            for field in &composite.fields {
                fields.push(DataField {
                    ident: field_ident(&field.name)?,
                    ty: type_ident(&field.ty)?,
                    nullable: field.can_be_null,
                    doc: self.doc(&field.comment),
                });
            }

            let implements = match &composite.extends {
                Some(base) if is_abstract_base(base) => Some(type_ident(base)?),
                _ => None,
            };

            types.push(DataType::Struct { ident: composite_ident, fields, implements, doc });
        }

        Ok(types)
    }

    fn doc(&self, comment: &str) -> Vec<String> {
        match self.config.emit_docs {
            true => wrap_comment(comment, self.config.line_width()),
            false => vec![],
        }
    }
}

fn artifact(kind: ArtifactKind, service: &str, code: TokenStream) -> Artifact {
    tracing::debug!(service, kind = ?kind, "synthesized artifact");
    Artifact { kind, service: service.to_owned(), text: code.to_string() }
}

/// Wraps `comment` into lines of at most `width` characters. Words are never split, so a word
/// longer than `width` is placed on a line of its own.
pub fn wrap_comment(comment: &str, width: usize) -> Vec<String> {
    let mut lines = vec![];
    let mut line = String::new();
    let mut line_len = 0;

    for word in comment.split_whitespace() {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }

    if line_len > 0 {
        lines.push(line);
    }
    lines
}

fn ident(name: &str) -> Result<Ident> {
    syn::parse_str::<Ident>(name).map_err(|_| Error::InvalidIdentifier(name.to_owned()))
}

fn type_ident(ty: &Type) -> Result<Ident> {
    ident(&ty.adapt_type())
}

/// Snake cased identifier, with a trailing underscore when the name is a keyword
fn field_ident(name: &str) -> Result<Ident> {
    let snake = name.to_snake_case();
    ident(&snake)
        .or_else(|_| ident(&format!("{}_", snake)))
        .map_err(|_| Error::InvalidIdentifier(name.to_owned()))
}
