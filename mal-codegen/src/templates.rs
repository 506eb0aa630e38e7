//! Templates for the generated stubs.
//!
//! The synthesizer resolves names, numbers and signatures from the internal representation into
//! the small view models below, and a [`Templates`] implementation turns those into source code.
//! Changing what the stubs look like (or which runtime they target) only requires another
//! implementation of the trait.

use proc_macro2::{Ident, Literal, TokenStream};
use quote::quote;

use crate::repr::PatternKind;

/// Names and numbers identifying a single service
#[derive(Debug, Clone)]
pub struct ServiceNames {
    pub area: String,
    pub area_number: u16,
    pub area_version: u16,
    pub service: String,
    pub service_number: u16,

    /// The generated service struct
    pub service_type: Ident,

    /// The generated provider trait
    pub provider_type: Ident,

    pub area_identifier_const: Ident,
    pub service_identifier_const: Ident,
    pub area_number_const: Ident,
    pub service_number_const: Ident,
    pub area_version_const: Ident,

    pub doc: Vec<String>,
}

/// The resolved signature of one operation
#[derive(Debug, Clone)]
pub struct Signature {
    pub operation: String,
    pub number: u16,
    pub kind: PatternKind,

    pub ident: Ident,
    pub test_ident: Ident,
    pub number_const: Ident,

    /// Parameters supplied by the consumer, in message order
    pub params: Vec<(Ident, Ident)>,

    /// Results returned by the provider, in message order
    pub results: Vec<Ident>,

    pub doc: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum DataType {
    Struct {
        ident: Ident,
        fields: Vec<DataField>,

        /// Abstract supertype implemented by this struct
        implements: Option<Ident>,

        doc: Vec<String>,
    },

    /// Composite without fields
    Abstract { ident: Ident, doc: Vec<String> },

    Enum { ident: Ident, variants: Vec<EnumVariant>, doc: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct DataField {
    pub ident: Ident,
    pub ty: Ident,
    pub nullable: bool,
    pub doc: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EnumVariant {
    pub ident: Ident,
    pub value: u32,
    pub doc: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ErrorCode {
    pub ident: Ident,
    pub number: u32,
    pub doc: Vec<String>,
}

pub trait Templates {
    fn constants(&self, service: &ServiceNames, operations: &[Signature]) -> TokenStream;

    fn service_declaration(&self, service: &ServiceNames) -> TokenStream;

    fn constructor(&self, service: &ServiceNames) -> TokenStream;

    fn consumer_operation(&self, service: &ServiceNames, operation: &Signature) -> TokenStream;

    fn provider(&self, service: &ServiceNames, operations: &[Signature]) -> TokenStream;

    fn data_types(&self, types: &[DataType]) -> TokenStream;

    fn errors(&self, errors: &[ErrorCode]) -> TokenStream;

    fn tests(&self, service: &ServiceNames, operations: &[Signature]) -> TokenStream;
}

/// Renders stubs as Rust source
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTemplates;

impl Templates for RustTemplates {
    fn constants(&self, service: &ServiceNames, operations: &[Signature]) -> TokenStream {
        let ServiceNames {
            area,
            service: service_name,
            area_identifier_const,
            service_identifier_const,
            area_number_const,
            service_number_const,
            area_version_const,
            ..
        } = service;

        let area_number = Literal::u16_unsuffixed(service.area_number);
        let service_number = Literal::u16_unsuffixed(service.service_number);
        let area_version = Literal::u16_unsuffixed(service.area_version);

        let op_consts = operations.iter().map(|op| &op.number_const);
        let op_numbers = operations.iter().map(|op| Literal::u16_unsuffixed(op.number));

        quote! {
            pub const #area_identifier_const: &str = #area;
            pub const #service_identifier_const: &str = #service_name;
            pub const #area_number_const: u16 = #area_number;
            pub const #service_number_const: u16 = #service_number;
            pub const #area_version_const: u16 = #area_version;

            #(pub const #op_consts: u16 = #op_numbers;)*
        }
    }

    fn service_declaration(&self, service: &ServiceNames) -> TokenStream {
        let ident = &service.service_type;
        let doc = doc_attrs(&service.doc);

        quote! {
            #doc
            pub struct #ident {
                pub area_identifier: &'static str,
                pub service_identifier: &'static str,
                pub area_number: u16,
                pub service_number: u16,
                pub area_version: u16,
                pub running: bool,
                pub lock: std::sync::Mutex<()>,
            }
        }
    }

    fn constructor(&self, service: &ServiceNames) -> TokenStream {
        let ident = &service.service_type;
        let ServiceNames {
            area_identifier_const,
            service_identifier_const,
            area_number_const,
            service_number_const,
            area_version_const,
            ..
        } = service;

        quote! {
            impl #ident {
                pub fn new() -> Self {
                    #ident {
                        area_identifier: #area_identifier_const,
                        service_identifier: #service_identifier_const,
                        area_number: #area_number_const,
                        service_number: #service_number_const,
                        area_version: #area_version_const,
                        running: false,
                        lock: std::sync::Mutex::new(()),
                    }
                }
            }
        }
    }

    fn consumer_operation(&self, service: &ServiceNames, operation: &Signature) -> TokenStream {
        let service_type = &service.service_type;
        let method = method_signature(operation);

        quote! {
            impl #service_type {
                #method {
                    unimplemented!()
                }
            }
        }
    }

    fn provider(&self, service: &ServiceNames, operations: &[Signature]) -> TokenStream {
        let provider_type = &service.provider_type;
        let methods = operations.iter().map(method_signature);

        quote! {
            pub trait #provider_type {
                #(#methods;)*
            }
        }
    }

    fn data_types(&self, types: &[DataType]) -> TokenStream {
        let definitions = types.iter().map(define_data_type);
        quote!(#(#definitions)*)
    }

    fn errors(&self, errors: &[ErrorCode]) -> TokenStream {
        let definitions = errors.iter().map(|error| {
            let ident = &error.ident;
            let number = Literal::u32_unsuffixed(error.number);
            let doc = doc_attrs(&error.doc);
            quote! {
                #doc
                pub const #ident: u32 = #number;
            }
        });
        quote!(#(#definitions)*)
    }

    fn tests(&self, service: &ServiceNames, operations: &[Signature]) -> TokenStream {
        let number_const = &service.service_number_const;
        let service_number = Literal::u16_unsuffixed(service.service_number);

        let tests = operations.iter().map(|op| {
            let test_ident = &op.test_ident;
            let op_const = &op.number_const;
            let op_number = Literal::u16_unsuffixed(op.number);
            quote! {
                #[test]
                fn #test_ident() {
                    assert_eq!(#op_const, #op_number);
                }
            }
        });

        quote! {
        }
    }
}

fn method_signature(operation: &Signature) -> TokenStream {
    let ident = &operation.ident;
    let doc = doc_attrs(&operation.doc);
    let param_names = operation.params.iter().map(|(name, _)| name);
    let param_types = operation.params.iter().map(|(_, ty)| ty);

    let results = &operation.results;
    let output = match &results[..] {
        [] => quote!(),
        [single] => quote!(-> #single),
        _ => quote!(-> (#(#results),*)),
    };

    quote! {
        #doc
        #[allow(non_snake_case)]
        fn #ident(&self, #(#param_names: #param_types),*) #output
    }
}

fn define_data_type(data_type: &DataType) -> TokenStream {
    match data_type {
        DataType::Struct { ident, fields, implements, doc } => {
            let doc = doc_attrs(doc);
            let field_defs = fields.iter().map(|field| {
                let DataField { ident, ty, nullable, doc } = field;
                let doc = doc_attrs(doc);
                match nullable {
                    true => quote!(#doc pub #ident: Option<#ty>),
                    false => quote!(#doc pub #ident: #ty),
                }
            });
            let implementation = implements.as_ref().map(|base| quote!(impl #base for #ident {}));

            quote! {
                #doc
                #[derive(Debug, Clone, PartialEq)]
                pub struct #ident {
                    #(#field_defs,)*
                }

                #implementation
            }
        }

        DataType::Abstract { ident, doc } => {
            let doc = doc_attrs(doc);
            quote! {
                #doc
                pub trait #ident {}
            }
        }

        DataType::Enum { ident, variants, doc } => {
            let doc = doc_attrs(doc);
            let variant_defs = variants.iter().map(|variant| {
                let EnumVariant { ident, value, doc } = variant;
                let doc = doc_attrs(doc);
                let value = Literal::u32_unsuffixed(*value);
                quote!(#doc #ident = #value)
            });

            quote! {
                #doc
                #[allow(bad_style)]
                #[derive(Debug, Clone, Copy, Eq, PartialEq)]
                #[repr(u32)]
                pub enum #ident {
                    #(#variant_defs,)*
                }
            }
        }
    }
}

fn doc_attrs(lines: &[String]) -> TokenStream {
    let lines = lines.iter().map(|line| format!(" {}", line));
    quote!(#(#[doc = #lines])*)
}
