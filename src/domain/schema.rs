//! Fixed metamodel schema: the class, attribute and association names the
//! engine writes through the Model Store. The schema is handed to the store
//! at startup; a store implementation validates every write against it.

use std::collections::HashSet;

/// Declaration and structural class names.
pub mod class {
    pub const PROGRAM: &str = "Program";
    pub const SOURCE_ROOT: &str = "SourceRoot";
    pub const PACKAGE: &str = "Package";
    pub const TRANSLATION_UNIT: &str = "TranslationUnit";
    pub const TYPE: &str = "Type";
    pub const METHOD: &str = "Method";
    pub const FIELD: &str = "Field";
    pub const LOCAL_VARIABLE: &str = "LocalVariable";
    pub const INITIALIZER: &str = "Initializer";
    pub const TYPE_PARAMETER: &str = "TypeParameter";
    pub const ANNOTATION: &str = "Annotation";
    pub const ANNOTATION_VALUE: &str = "AnnotationValue";
    pub const COMMENT: &str = "Comment";
    /// Handled alongside statements though not itself a statement.
    pub const CATCH_CLAUSE: &str = "CatchClause";

    /// One class per statement kind; instance counts drive statement naming.
    pub const STATEMENT_CLASSES: &[&str] = &[
        "AssertStatement",
        "Block",
        "BreakStatement",
        "ConstructorInvocation",
        "ContinueStatement",
        "DoStatement",
        "EmptyStatement",
        "EnhancedForStatement",
        "ExpressionStatement",
        "ForStatement",
        "IfStatement",
        "LabeledStatement",
        "ReturnStatement",
        "SuperConstructorInvocation",
        "SwitchCase",
        "SwitchStatement",
        "SynchronizedStatement",
        "ThrowStatement",
        "TryStatement",
        "TypeDeclarationStatement",
        "VariableDeclarationStatement",
        "WhileStatement",
    ];
}

/// Attribute names.
pub mod attr {
    pub const NAME: &str = "name";
    pub const HANDLE: &str = "handle";
    pub const KEY: &str = "key";
    pub const SHORT_KEY: &str = "shortKey";
    pub const VISIBILITY: &str = "visibility";
    pub const IS_FINAL: &str = "isFinal";
    pub const IS_STATIC: &str = "isStatic";
    pub const IS_ABSTRACT: &str = "isAbstract";
    pub const IS_SYNTHETIC: &str = "isSynthetic";
    pub const IS_DEPRECATED: &str = "isDeprecated";
    pub const IS_CONSTRUCTOR: &str = "isConstructor";
    pub const IS_SYNCHRONIZED: &str = "isSynchronized";
    pub const IS_NATIVE: &str = "isNative";
    pub const IS_BRIDGE: &str = "isBridge";
    pub const HAS_VARARGS: &str = "hasVarargs";
    pub const IS_VOLATILE: &str = "isVolatile";
    pub const IS_TRANSIENT: &str = "isTransient";
    pub const IS_STRICTFP: &str = "isStrictfp";
    pub const TYPE_KIND: &str = "typeKind";
    pub const ROOT_KIND: &str = "rootKind";
    pub const ARRAY_DIMENSIONS: &str = "arrayDimensions";
    pub const RETURN_TYPE_ARRAY_DIMENSIONS: &str = "returnTypeArrayDimensions";
    pub const START_POSITION: &str = "startPosition";
    pub const LENGTH: &str = "length";
    pub const CONDITIONAL_OPERATOR_COUNT: &str = "conditionalOperatorCount";
    pub const OPTIONAL_LABEL: &str = "optionalLabel";
    pub const IS_DEFAULT: &str = "isDefault";
    pub const KIND: &str = "kind";
    pub const VALUE: &str = "value";
}

/// Enumeration names used by enum-valued attributes.
pub mod enums {
    pub const VISIBILITY: &str = "Visibility";
    pub const TYPE_KIND: &str = "TypeKind";
    pub const ROOT_KIND: &str = "SourceRootKind";
    pub const COMMENT_KIND: &str = "CommentKind";
}

/// Association names.
pub mod assoc {
    // Containment
    pub const PROGRAM_HAS_SOURCE_ROOT: &str = "program-has-source-root";
    pub const SOURCE_ROOT_HAS_PACKAGE: &str = "source-root-has-package";
    pub const PACKAGE_HAS_TRANSLATION_UNIT: &str = "package-has-translation-unit";
    pub const TRANSLATION_UNIT_HAS_TYPE: &str = "translation-unit-has-type";
    pub const TYPE_HAS_FIELD: &str = "type-has-field";
    pub const TYPE_HAS_METHOD: &str = "type-has-method";
    pub const TYPE_HAS_INITIALIZER: &str = "type-has-initializer";
    pub const TYPE_HAS_TYPE_PARAMETER: &str = "type-has-type-parameter";
    pub const TYPE_NESTED_IN_TYPE: &str = "type-nested-in-type";
    pub const TRANSLATION_UNIT_HAS_COMMENT: &str = "translation-unit-has-comment";

    // Cross references
    pub const TYPE_EXTENDS_TYPE: &str = "type-extends-type";
    pub const TYPE_IMPLEMENTS_TYPE: &str = "type-implements-type";
    pub const TYPE_PARAMETER_BOUNDED_BY_TYPE: &str = "type-parameter-bounded-by-type";
    pub const METHOD_HAS_RETURN_TYPE: &str = "method-has-return-type";
    pub const METHOD_THROWS_TYPE: &str = "method-throws-type";
    pub const METHOD_HAS_PARAMETER: &str = "method-has-parameter";
    pub const FIELD_HAS_TYPE: &str = "field-has-type";
    pub const LOCAL_VARIABLE_HAS_TYPE: &str = "local-variable-has-type";
    pub const ELEMENT_HAS_ANNOTATION: &str = "element-has-annotation";
    pub const ANNOTATION_HAS_TYPE: &str = "annotation-has-type";
    pub const ANNOTATION_HAS_VALUE: &str = "annotation-has-value";
    pub const ANNOTATION_VALUE_FOR_FIELD: &str = "annotation-value-for-field";

    // Bodies and statement structure
    pub const METHOD_HAS_BODY: &str = "method-has-body";
    pub const INITIALIZER_HAS_BODY: &str = "initializer-has-body";
    pub const BLOCK_HAS_STATEMENT: &str = "block-has-statement";
    pub const SWITCH_HAS_STATEMENT: &str = "switch-has-statement";
    pub const STATEMENT_HAS_BODY: &str = "statement-has-body";
    pub const IF_HAS_THEN_BRANCH: &str = "if-has-then-branch";
    pub const IF_HAS_ELSE_BRANCH: &str = "if-has-else-branch";
    pub const TRY_HAS_FINALLY: &str = "try-has-finally";
    pub const TRY_HAS_CATCH_CLAUSE: &str = "try-has-catch-clause";
    pub const CATCH_CLAUSE_HAS_LOCAL_VARIABLE: &str = "catch-clause-has-local-variable";
    pub const STATEMENT_DECLARES_LOCAL_VARIABLE: &str = "statement-declares-local-variable";
    pub const STATEMENT_DECLARES_TYPE: &str = "statement-declares-type";
    pub const METHOD_HAS_LOCAL_VARIABLE: &str = "method-has-local-variable";
    pub const INITIALIZER_HAS_LOCAL_VARIABLE: &str = "initializer-has-local-variable";

    // Dependency edges
    pub const STATEMENT_DEPENDS_ON_TYPE: &str = "statement-depends-on-type";
    pub const STATEMENT_DEPENDS_ON_METHOD: &str = "statement-depends-on-method";
    pub const STATEMENT_DEPENDS_ON_FIELD: &str = "statement-depends-on-field";

    pub const ALL: &[&str] = &[
        PROGRAM_HAS_SOURCE_ROOT,
        SOURCE_ROOT_HAS_PACKAGE,
        PACKAGE_HAS_TRANSLATION_UNIT,
        TRANSLATION_UNIT_HAS_TYPE,
        TYPE_HAS_FIELD,
        TYPE_HAS_METHOD,
        TYPE_HAS_INITIALIZER,
        TYPE_HAS_TYPE_PARAMETER,
        TYPE_NESTED_IN_TYPE,
        TRANSLATION_UNIT_HAS_COMMENT,
        TYPE_EXTENDS_TYPE,
        TYPE_IMPLEMENTS_TYPE,
        TYPE_PARAMETER_BOUNDED_BY_TYPE,
        METHOD_HAS_RETURN_TYPE,
        METHOD_THROWS_TYPE,
        METHOD_HAS_PARAMETER,
        FIELD_HAS_TYPE,
        LOCAL_VARIABLE_HAS_TYPE,
        ELEMENT_HAS_ANNOTATION,
        ANNOTATION_HAS_TYPE,
        ANNOTATION_HAS_VALUE,
        ANNOTATION_VALUE_FOR_FIELD,
        METHOD_HAS_BODY,
        INITIALIZER_HAS_BODY,
        BLOCK_HAS_STATEMENT,
        SWITCH_HAS_STATEMENT,
        STATEMENT_HAS_BODY,
        IF_HAS_THEN_BRANCH,
        IF_HAS_ELSE_BRANCH,
        TRY_HAS_FINALLY,
        TRY_HAS_CATCH_CLAUSE,
        CATCH_CLAUSE_HAS_LOCAL_VARIABLE,
        STATEMENT_DECLARES_LOCAL_VARIABLE,
        STATEMENT_DECLARES_TYPE,
        METHOD_HAS_LOCAL_VARIABLE,
        INITIALIZER_HAS_LOCAL_VARIABLE,
        STATEMENT_DEPENDS_ON_TYPE,
        STATEMENT_DEPENDS_ON_METHOD,
        STATEMENT_DEPENDS_ON_FIELD,
    ];
}

/// The schema handed to a Model Store at startup.
#[derive(Debug, Clone)]
pub struct Schema {
    classes: HashSet<&'static str>,
    attributes: HashSet<&'static str>,
    associations: HashSet<&'static str>,
}

impl Schema {
    /// The fixed metamodel assumed by the whole engine.
    pub fn metamodel() -> Self {
        let mut classes: HashSet<&'static str> = [
            class::PROGRAM,
            class::SOURCE_ROOT,
            class::PACKAGE,
            class::TRANSLATION_UNIT,
            class::TYPE,
            class::METHOD,
            class::FIELD,
            class::LOCAL_VARIABLE,
            class::INITIALIZER,
            class::TYPE_PARAMETER,
            class::ANNOTATION,
            class::ANNOTATION_VALUE,
            class::COMMENT,
            class::CATCH_CLAUSE,
        ]
        .into();
        classes.extend(class::STATEMENT_CLASSES);

        let attributes: HashSet<&'static str> = [
            attr::NAME,
            attr::HANDLE,
            attr::KEY,
            attr::SHORT_KEY,
            attr::VISIBILITY,
            attr::IS_FINAL,
            attr::IS_STATIC,
            attr::IS_ABSTRACT,
            attr::IS_SYNTHETIC,
            attr::IS_DEPRECATED,
            attr::IS_CONSTRUCTOR,
            attr::IS_SYNCHRONIZED,
            attr::IS_NATIVE,
            attr::IS_BRIDGE,
            attr::HAS_VARARGS,
            attr::IS_VOLATILE,
            attr::IS_TRANSIENT,
            attr::IS_STRICTFP,
            attr::TYPE_KIND,
            attr::ROOT_KIND,
            attr::ARRAY_DIMENSIONS,
            attr::RETURN_TYPE_ARRAY_DIMENSIONS,
            attr::START_POSITION,
            attr::LENGTH,
            attr::CONDITIONAL_OPERATOR_COUNT,
            attr::OPTIONAL_LABEL,
            attr::IS_DEFAULT,
            attr::KIND,
            attr::VALUE,
        ]
        .into();

        let associations = assoc::ALL.iter().copied().collect();

        Self {
            classes,
            attributes,
            associations,
        }
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    pub fn has_association(&self, name: &str) -> bool {
        self.associations.contains(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.classes.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metamodel_contains_statement_classes_and_dependency_associations() {
        let schema = Schema::metamodel();
        assert!(schema.has_class("IfStatement"));
        assert!(schema.has_class(class::CATCH_CLAUSE));
        assert!(schema.has_association(assoc::STATEMENT_DEPENDS_ON_TYPE));
        assert!(schema.has_attribute(attr::CONDITIONAL_OPERATOR_COUNT));
        assert!(!schema.has_class("NoSuchClass"));
    }
}
