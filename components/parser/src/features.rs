//! Optional-syntax feature registry.
//!
//! A [`Features`] value is constructed once, before parsing begins, and is
//! only ever read after that. Both the lexer and the parser consult it to
//! decide whether a construct is legal and which diagnostic to raise when a
//! disabled feature's syntax is encountered.

use bitflags::bitflags;

bitflags! {
    /// Independently toggleable optional-syntax flags.
    ///
    /// The set is immutable once parsing starts; it may be shared read-only
    /// across parses of independent source units.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Features: u32 {
        /// BigInt literals (`123n`, `0x10n`)
        const BIGINT = 1 << 0;
        /// Class private fields, methods and accessors (`#name`)
        const CLASS_PRIVATE_FIELDS = 1 << 1;
        /// Class public field declarations (`class C { x = 1 }`)
        const CLASS_PUBLIC_FIELDS = 1 << 2;
        /// Class static initialization blocks (`static { ... }`)
        const CLASS_STATIC_BLOCKS = 1 << 3;
        /// Dynamic `import()` call expressions
        const DYNAMIC_IMPORT = 1 << 4;
        /// `import.meta` meta property
        const IMPORT_META = 1 << 5;
        /// Raw U+2028/U+2029 permitted inside string literals
        const JSON_STRINGS = 1 << 6;
        /// JSX elements and fragments
        const JSX = 1 << 7;
        /// Namespaced JSX names (`<ns:tag>`); requires [`Features::JSX`]
        const JSX_NAMESPACES = 1 << 8;
        /// Logical assignment operators (`&&=`, `||=`, `??=`)
        const LOGICAL_ASSIGNMENT = 1 << 9;
        /// `await` at the top level of the program
        const TOP_LEVEL_AWAIT = 1 << 10;
        /// Type-annotation subset (`x: T` on bindings/parameters, return
        /// types)
        const TYPE_ANNOTATIONS = 1 << 11;
        /// Treat the whole program as strict-mode code
        const STRICT = 1 << 12;
    }
}

impl Default for Features {
    /// Sensible defaults: the plain ECMAScript extensions are on, strict
    /// mode and the dialect extensions (JSX, type annotations) are off.
    fn default() -> Self {
        Features::BIGINT
            | Features::CLASS_PRIVATE_FIELDS
            | Features::CLASS_PUBLIC_FIELDS
            | Features::CLASS_STATIC_BLOCKS
            | Features::DYNAMIC_IMPORT
            | Features::IMPORT_META
            | Features::JSON_STRINGS
            | Features::LOGICAL_ASSIGNMENT
            | Features::TOP_LEVEL_AWAIT
    }
}
