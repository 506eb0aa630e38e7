use mal_codegen::{
    lift, lift_with, repr::PatternKind, synthesize, Artifact, ArtifactKind, Error, LiftConfig,
    Strictness,
};
use pretty_assertions::assert_eq;
use quote::ToTokens;

const SERVICE_DEF: &[u8] = include_bytes!("fixtures/ServiceDefCOM.xml");

fn find<'a>(artifacts: &'a [Artifact], kind: &ArtifactKind) -> &'a Artifact {
    artifacts.iter().find(|a| &a.kind == kind).unwrap_or_else(|| panic!("missing {:?}", kind))
}

fn method(artifact: &Artifact) -> syn::Signature {
    let file = syn::parse_file(&artifact.text).unwrap();
    match &file.items[..] {
        [syn::Item::Impl(item)] => match &item.items[..] {
            [syn::ImplItem::Method(method)] => method.sig.clone(),
            other => panic!("expected a single method, found {} items", other.len()),
        },
        other => panic!("expected a single impl block, found {} items", other.len()),
    }
}

fn tokens<T: ToTokens>(value: &T) -> String {
    value.to_token_stream().to_string()
}

fn param_types(sig: &syn::Signature) -> Vec<String> {
    sig.inputs
        .iter()
        .filter_map(|arg| match arg {
            syn::FnArg::Typed(pat) => Some(tokens(&*pat.ty)),
            syn::FnArg::Receiver(_) => None,
        })
        .collect()
}

#[test]
fn lifts_areas_services_and_data_types() {
    let model = lift(SERVICE_DEF).unwrap();
    assert_eq!(model.areas.len(), 1);

    let area = &model.areas[0];
    assert_eq!((area.name.as_str(), area.number, area.version), ("COM", 2, 1));
    assert_eq!(area.requirements, "3.1");

    let area_composites: Vec<_> = area.composites.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(area_composites, vec!["ObjectType", "ObjectKey", "ObjectId", "ObjectDetails"]);

    let service_composites: usize = area.services.iter().map(|s| s.composites.len()).sum();
    assert_eq!(service_composites, 4);

    let object_type = &area.composites[0];
    let fields: Vec<_> = object_type.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["area", "service", "version", "number"]);

    let errors: Vec<_> = area.errors.iter().map(|e| (e.name.as_str(), e.number)).collect();
    assert_eq!(errors, vec![("INVALID", 70000), ("DUPLICATE", 70001)]);
}

#[test]
fn lifts_operations_with_canonical_patterns() {
    let model = lift(SERVICE_DEF).unwrap();
    let archive = &model.areas[0].services[0];
    assert_eq!(archive.area, "COM");

    let shapes: Vec<_> = archive
        .operations
        .iter()
        .map(|op| (op.name.as_str(), op.pattern.kind, op.pattern.message_names()))
        .collect();
    assert_eq!(shapes, vec![
        ("retrieve", PatternKind::Invoke, vec!["invoke", "ack", "response"]),
        ("query", PatternKind::Progress, vec!["progress", "update", "response"]),
        ("count", PatternKind::Request, vec!["request", "response"]),
        ("storeObjects", PatternKind::Submit, vec!["submit", "ack"]),
        ("monitorArchive", PatternKind::PubSub, vec!["publishNotify"]),
        ("ping", PatternKind::Send, vec!["send"]),
    ]);

    let ping = &archive.operations[5];
    assert!(ping.pattern.messages[0].types.is_empty());

    let retrieve = &archive.operations[0];
    assert!(retrieve.pattern.messages[1].types.is_empty());
    let invoke_types: Vec<_> =
        retrieve.pattern.messages[0].types.iter().map(|t| t.adapt_type()).collect();
    assert_eq!(invoke_types, vec!["ObjectType", "IdentifierList", "LongList"]);
}

#[test]
fn field_less_composites_are_abstract() {
    let model = lift(SERVICE_DEF).unwrap();
    let archive = &model.areas[0].services[0];

    let abstract_types: Vec<_> = archive.abstract_types().map(|c| c.name.as_str()).collect();
    assert_eq!(abstract_types, vec!["QueryFilter"]);
    assert!(archive.is_abstract_type("QueryFilter"));
    assert!(!archive.is_abstract_type("ArchiveQuery"));
    assert_eq!(model.areas[0].abstract_types().count(), 0);

    let filter_set = archive.composites.iter().find(|c| c.name == "CompositeFilterSet").unwrap();
    assert_eq!(filter_set.extends.as_ref().map(|t| t.name.as_str()), Some("QueryFilter"));
}

#[test]
fn only_local_abstract_bases_are_implemented() {
    let model = lift(SERVICE_DEF).unwrap();
    let artifacts = synthesize(&model).unwrap();

    let data = find(&artifacts, &ArtifactKind::Data);
    let file = syn::parse_file(&data.text).unwrap();
    let impls: Vec<_> = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Impl(item) => Some(tokens(&item.self_ty)),
            _ => None,
        })
        .collect();
    assert_eq!(impls, vec!["CompositeFilterSet"]);
    assert!(data.text.contains("impl QueryFilter for CompositeFilterSet"));
}

#[test]
fn submit_operation_stub_and_constants() {
    let model = lift(SERVICE_DEF).unwrap();
    let store = &model.areas[0].services[0].operations[3];
    assert_eq!(store.pattern.message_names(), vec!["submit", "ack"]);

    let artifacts = synthesize(&model).unwrap();

    let constants = find(&artifacts, &ArtifactKind::Constants);
    assert_eq!(constants.service, "Archive");
    let file = syn::parse_file(&constants.text).unwrap();
    let names: Vec<_> = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Const(c) => Some(c.ident.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec![
        "ARCHIVE_SERVICE_AREA_IDENTIFIER",
        "ARCHIVE_SERVICE_SERVICE_IDENTIFIER",
        "ARCHIVE_SERVICE_AREA_NUMBER",
        "ARCHIVE_SERVICE_SERVICE_NUMBER",
        "ARCHIVE_SERVICE_AREA_VERSION",
        "OPERATION_IDENTIFIER_RETRIEVE",
        "OPERATION_IDENTIFIER_QUERY",
        "OPERATION_IDENTIFIER_COUNT",
        "OPERATION_IDENTIFIER_STOREOBJECTS",
        "OPERATION_IDENTIFIER_MONITORARCHIVE",
        "OPERATION_IDENTIFIER_PING",
    ]);

    let stub = find(&artifacts, &ArtifactKind::ConsumerOperation("storeObjects".into()));
    let sig = method(stub);
    assert_eq!(sig.ident.to_string(), "StoreObjects");
    assert_eq!(param_types(&sig), vec!["ArchiveDetailsListList"]);
    assert!(matches!(sig.output, syn::ReturnType::Default));
}

#[test]
fn request_stub_returns_response_types_in_order() {
    let artifacts = synthesize(&lift(SERVICE_DEF).unwrap()).unwrap();
    let sig = method(find(&artifacts, &ArtifactKind::ConsumerOperation("count".into())));

    assert_eq!(param_types(&sig), vec!["ObjectTypeList", "ArchiveQueryList"]);
    match &sig.output {
        syn::ReturnType::Type(_, ty) => match &**ty {
            syn::Type::Tuple(tuple) => {
                let elems: Vec<_> = tuple.elems.iter().map(tokens).collect();
                assert_eq!(elems, vec!["LongList", "Boolean"]);
            }
            other => panic!("expected a tuple, found {}", tokens(other)),
        },
        syn::ReturnType::Default => panic!("missing return type"),
    }
}

#[test]
fn enumeration_items_keep_source_order() {
    let artifacts = synthesize(&lift(SERVICE_DEF).unwrap()).unwrap();
    let data = find(&artifacts, &ArtifactKind::Data);
    let file = syn::parse_file(&data.text).unwrap();

    let variants: Vec<_> = file
        .items
        .iter()
        .find_map(|item| match item {
            syn::Item::Enum(e) if e.ident == "ExpressionOperator" => Some(
                e.variants
                    .iter()
                    .map(|v| {
                        let value = v.discriminant.as_ref().map(|(_, expr)| tokens(expr));
                        (v.ident.to_string(), value.unwrap_or_default())
                    })
                    .collect(),
            ),
            _ => None,
        })
        .unwrap();

    assert_eq!(variants, vec![
        ("GREATER".to_string(), "3".to_string()),
        ("EQUAL".to_string(), "1".to_string()),
        ("DIFFER".to_string(), "2".to_string()),
    ]);
}

#[test]
fn every_artifact_is_valid_rust() {
    let artifacts = synthesize(&lift(SERVICE_DEF).unwrap()).unwrap();
    assert_eq!(artifacts.len(), 1 + 3 + 6 + 4);

    for artifact in &artifacts {
        if let Err(e) = syn::parse_file(&artifact.text) {
            panic!("{:?} for {} does not parse: {}", artifact.kind, artifact.service, e);
        }
    }

    let area_data = find(&artifacts, &ArtifactKind::AreaData);
    assert_eq!(area_data.service, "COM");
    assert!(area_data.text.contains("pub type_ : ObjectType"));

    let errors = find(&artifacts, &ArtifactKind::Errors);
    assert!(errors.text.contains("pub const ERROR_INVALID : u32 = 70000"));

    let provider = syn::parse_file(&find(&artifacts, &ArtifactKind::Provider).text).unwrap();
    match &provider.items[..] {
        [syn::Item::Trait(item)] => {
            assert_eq!(item.ident, "ArchiveProvider");
            assert_eq!(item.items.len(), 6);
        }
        _ => panic!("expected a provider trait"),
    }
}

#[test]
fn operation_comments_become_wrapped_doc_lines() {
    let artifacts = synthesize(&lift(SERVICE_DEF).unwrap()).unwrap();
    let sig_artifact = find(&artifacts, &ArtifactKind::ConsumerOperation("retrieve".into()));
    let file = syn::parse_file(&sig_artifact.text).unwrap();

    let docs: Vec<String> = match &file.items[..] {
        [syn::Item::Impl(item)] => match &item.items[..] {
            [syn::ImplItem::Method(method)] => method
                .attrs
                .iter()
                .filter(|attr| attr.path.is_ident("doc"))
                .filter_map(|attr| match attr.parse_meta() {
                    Ok(syn::Meta::NameValue(syn::MetaNameValue {
                        lit: syn::Lit::Str(s), ..
                    })) => Some(s.value().trim().to_string()),
                    _ => None,
                })
                .collect(),
            _ => panic!("expected a single method"),
        },
        _ => panic!("expected a single impl block"),
    };

    assert!(docs.len() > 1);
    assert!(docs.iter().all(|line| line.chars().count() <= 60));
    assert_eq!(
        docs.join(" "),
        "The retrieve operation retrieves a set of objects identified by their object instance \
         identifiers."
    );
}

const DUPLICATE_OPERATIONS: &str = r#"
    <specification>
      <area name="COM" number="2" version="1">
        <service name="Archive" number="2">
          <capabilitySet number="1">
            <sendIP name="ping" number="1"><messages/></sendIP>
          </capabilitySet>
          <capabilitySet number="2">
            <sendIP name="ping" number="2"><messages/></sendIP>
          </capabilitySet>
        </service>
      </area>
    </specification>
"#;

#[test]
fn duplicate_operations_are_rejected_when_strict() {
    let err = lift(DUPLICATE_OPERATIONS.as_bytes()).unwrap_err();
    match err {
        Error::DuplicateOperationName { service, operation } => {
            assert_eq!((service.as_str(), operation.as_str()), ("Archive", "ping"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn duplicate_operations_are_kept_when_lenient() {
    let config = LiftConfig { strictness: Strictness::Lenient };
    let model = lift_with(DUPLICATE_OPERATIONS.as_bytes(), &config).unwrap();
    let numbers: Vec<_> = model.areas[0].services[0].operations.iter().map(|op| op.number).collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[test]
fn duplicate_type_names_are_rejected_when_strict() {
    let xml = r#"
        <specification>
          <area name="COM" number="2" version="1">
            <dataTypes>
              <composite name="ObjectKey"/>
              <composite name="ObjectKey"/>
            </dataTypes>
          </area>
        </specification>
    "#;
    match lift(xml.as_bytes()).unwrap_err() {
        Error::DuplicateTypeName { scope, name } => {
            assert_eq!((scope.as_str(), name.as_str()), ("COM", "ObjectKey"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn unknown_operation_elements_are_malformed() {
    let xml = r#"
        <specification>
          <area name="COM" number="2" version="1">
            <service name="Archive" number="2">
              <capabilitySet number="1">
                <streamIP name="watch" number="1"><messages/></streamIP>
              </capabilitySet>
            </service>
          </area>
        </specification>
    "#;
    assert!(matches!(lift(xml.as_bytes()), Err(Error::MalformedDocument(_))));
}

#[test]
fn non_numeric_numbers_are_malformed() {
    let xml = r#"<specification><area name="COM" number="two" version="1"/></specification>"#;
    assert!(matches!(lift(xml.as_bytes()), Err(Error::MalformedDocument(_))));
}
