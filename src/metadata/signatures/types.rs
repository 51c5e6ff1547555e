use strum::{Display, EnumCount, EnumIter, FromRepr};

use crate::metadata::{
    signatures::{SignatureFlags, ELEMENT_TYPE},
    token::Token,
};

/// The primitive element types (II.23.1.16).
///
/// Discriminants are the element-type bytes that encode them, so the dispatcher's
/// primitive lookup is [`PrimitiveKind::from_element_type`]. Being `Copy` and
/// stateless, every `Primitive` leaf is effectively an interned singleton.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumCount, FromRepr,
)]
#[repr(u8)]
pub enum PrimitiveKind {
    /// void
    #[strum(serialize = "void")]
    Void = 0x01,
    /// bool
    #[strum(serialize = "bool")]
    Boolean = 0x02,
    /// char
    #[strum(serialize = "char")]
    Char = 0x03,
    /// signed 8bit integer
    #[strum(serialize = "int8")]
    I1 = 0x04,
    /// unsigned 8bit integer
    #[strum(serialize = "uint8")]
    U1 = 0x05,
    /// signed 16bit integer
    #[strum(serialize = "int16")]
    I2 = 0x06,
    /// unsigned 16bit integer
    #[strum(serialize = "uint16")]
    U2 = 0x07,
    /// signed 32bit integer
    #[strum(serialize = "int32")]
    I4 = 0x08,
    /// unsigned 32bit integer
    #[strum(serialize = "uint32")]
    U4 = 0x09,
    /// signed 64bit integer
    #[strum(serialize = "int64")]
    I8 = 0x0A,
    /// unsigned 64bit integer
    #[strum(serialize = "uint64")]
    U8 = 0x0B,
    /// 32bit floating-point
    #[strum(serialize = "float32")]
    R4 = 0x0C,
    /// 64bit floating-point
    #[strum(serialize = "float64")]
    R8 = 0x0D,
    /// System.String
    #[strum(serialize = "string")]
    String = 0x0E,
    /// System.TypedReference
    #[strum(serialize = "typedref")]
    TypedByRef = 0x16,
    /// signed integer, sized to executing platform
    #[strum(serialize = "native int")]
    I = 0x18,
    /// unsigned integer, sized to executing platform
    #[strum(serialize = "native uint")]
    U = 0x19,
    /// System.Object
    #[strum(serialize = "object")]
    Object = 0x1C,
}

impl PrimitiveKind {
    /// Look up the primitive encoded by an element-type byte.
    #[must_use]
    pub fn from_element_type(byte: u8) -> Option<Self> {
        Self::from_repr(byte)
    }

    /// The element-type byte that encodes this primitive.
    #[must_use]
    pub fn element_type(self) -> u8 {
        self as u8
    }

    /// The full name of the runtime type backing this primitive, e.g. `System.Int32`.
    #[must_use]
    pub fn system_name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "System.Void",
            PrimitiveKind::Boolean => "System.Boolean",
            PrimitiveKind::Char => "System.Char",
            PrimitiveKind::I1 => "System.SByte",
            PrimitiveKind::U1 => "System.Byte",
            PrimitiveKind::I2 => "System.Int16",
            PrimitiveKind::U2 => "System.UInt16",
            PrimitiveKind::I4 => "System.Int32",
            PrimitiveKind::U4 => "System.UInt32",
            PrimitiveKind::I8 => "System.Int64",
            PrimitiveKind::U8 => "System.UInt64",
            PrimitiveKind::R4 => "System.Single",
            PrimitiveKind::R8 => "System.Double",
            PrimitiveKind::String => "System.String",
            PrimitiveKind::TypedByRef => "System.TypedReference",
            PrimitiveKind::I => "System.IntPtr",
            PrimitiveKind::U => "System.UIntPtr",
            PrimitiveKind::Object => "System.Object",
        }
    }
}

/// A decoded type, as it appears in any signature kind.
///
/// Composite variants exclusively own their children; the tree is built bottom-up
/// during decoding and never edited afterwards. Generic parameters refer to their
/// declaration by index, so no node ever refers back to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    /// A primitive leaf
    Primitive(PrimitiveKind),
    /// A reference type, `TypeDefOrRefOrSpecEncoded`
    Class(Token),
    /// A value type, `TypeDefOrRefOrSpecEncoded`
    ValueType(Token),
    /// Single dimension array with a zero lower bound
    SzArray(Box<TypeNode>),
    /// General array
    Array(SignatureArray),
    /// Unmanaged pointer
    Ptr(Box<TypeNode>),
    /// Managed reference
    ByRef(Box<TypeNode>),
    /// Generic parameter, referenced by position
    GenericParam {
        /// Position in the declaring type's or method's generic parameter list
        index: u32,
        /// `true` for a method parameter (`!!index`), `false` for a type parameter (`!index`)
        method: bool,
    },
    /// Generic type and its arguments
    GenericInst(GenericInstance),
    /// Function pointer
    FnPtr(Box<MethodSignature>),
    /// A custom modifier applied to the type it wraps
    Modified(ModifiedType),
    /// A pinned local
    Pinned(Box<TypeNode>),
}

/// A general array: `element[rank]` with optional sizes and lower bounds (II.23.2.13)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureArray {
    /// The type in the array
    pub element: Box<TypeNode>,
    /// The number of dimensions
    pub rank: u32,
    /// Sizes of the leading dimensions (at most `rank`, in order from dimension 0)
    pub sizes: Vec<u32>,
    /// Lower bounds of the leading dimensions (at most `rank`, in order from dimension 0)
    pub lower_bounds: Vec<i32>,
}

/// A generic instantiation, e.g. `List<int>` (II.23.2.12)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericInstance {
    /// The generic type definition being instantiated
    pub base: Token,
    /// `true` if the base was encoded as `VALUETYPE`, `false` for `CLASS`
    pub value_type: bool,
    /// The type arguments, in declaration order
    pub args: Vec<TypeNode>,
}

/// A `modreq` / `modopt` custom modifier (II.23.2.7)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModifiedType {
    /// The modifier type
    pub modifier: Token,
    /// `true` for `CMOD_REQD`, `false` for `CMOD_OPT`
    pub required: bool,
    /// The modified type, which may itself carry further modifiers
    pub inner: Box<TypeNode>,
}

impl TypeNode {
    /// Wrap `inner` as a single dimension array.
    #[must_use]
    pub fn sz_array(inner: TypeNode) -> Self {
        TypeNode::SzArray(Box::new(inner))
    }

    /// Wrap `inner` as an unmanaged pointer.
    #[must_use]
    pub fn ptr(inner: TypeNode) -> Self {
        TypeNode::Ptr(Box::new(inner))
    }

    /// Wrap `inner` as a managed reference.
    #[must_use]
    pub fn by_ref(inner: TypeNode) -> Self {
        TypeNode::ByRef(Box::new(inner))
    }

    /// Wrap `inner` as a pinned type.
    #[must_use]
    pub fn pinned(inner: TypeNode) -> Self {
        TypeNode::Pinned(Box::new(inner))
    }

    /// Wrap `inner` with a custom modifier.
    #[must_use]
    pub fn modified(modifier: Token, required: bool, inner: TypeNode) -> Self {
        TypeNode::Modified(ModifiedType {
            modifier,
            required,
            inner: Box::new(inner),
        })
    }

    /// Returns `true` if this node is `void`.
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeNode::Primitive(PrimitiveKind::Void))
    }

    /// Strips custom modifiers and `pinned` wrappers, which do not change the identity
    /// of a type when matching signatures.
    #[must_use]
    pub fn unmodified(&self) -> &TypeNode {
        let mut current = self;
        loop {
            match current {
                TypeNode::Modified(modified) => current = &modified.inner,
                TypeNode::Pinned(inner) => current = inner,
                _ => return current,
            }
        }
    }

    /// Returns `true` if this type is pinned, looking through custom modifiers.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        let mut current = self;
        loop {
            match current {
                TypeNode::Pinned(_) => return true,
                TypeNode::Modified(modified) => current = &modified.inner,
                _ => return false,
            }
        }
    }

    /// The element-type byte that introduces this node in the encoding.
    #[must_use]
    pub fn element_type(&self) -> u8 {
        match self {
            TypeNode::Primitive(kind) => kind.element_type(),
            TypeNode::Class(_) => ELEMENT_TYPE::CLASS,
            TypeNode::ValueType(_) => ELEMENT_TYPE::VALUETYPE,
            TypeNode::SzArray(_) => ELEMENT_TYPE::SZARRAY,
            TypeNode::Array(_) => ELEMENT_TYPE::ARRAY,
            TypeNode::Ptr(_) => ELEMENT_TYPE::PTR,
            TypeNode::ByRef(_) => ELEMENT_TYPE::BYREF,
            TypeNode::GenericParam { method: false, .. } => ELEMENT_TYPE::VAR,
            TypeNode::GenericParam { method: true, .. } => ELEMENT_TYPE::MVAR,
            TypeNode::GenericInst(_) => ELEMENT_TYPE::GENERICINST,
            TypeNode::FnPtr(_) => ELEMENT_TYPE::FNPTR,
            TypeNode::Modified(ModifiedType { required: true, .. }) => ELEMENT_TYPE::CMOD_REQD,
            TypeNode::Modified(ModifiedType { required: false, .. }) => ELEMENT_TYPE::CMOD_OPT,
            TypeNode::Pinned(_) => ELEMENT_TYPE::PINNED,
        }
    }

    /// Nesting depth of this tree, counting a leaf as 1.
    ///
    /// A function pointer contributes the depth of its deepest return or parameter type.
    #[must_use]
    pub fn depth(&self) -> usize {
        let children = match self {
            TypeNode::Primitive(_)
            | TypeNode::Class(_)
            | TypeNode::ValueType(_)
            | TypeNode::GenericParam { .. } => 0,
            TypeNode::SzArray(inner)
            | TypeNode::Ptr(inner)
            | TypeNode::ByRef(inner)
            | TypeNode::Pinned(inner) => inner.depth(),
            TypeNode::Modified(modified) => modified.inner.depth(),
            TypeNode::Array(array) => array.element.depth(),
            TypeNode::GenericInst(inst) => inst.args.iter().map(TypeNode::depth).max().unwrap_or(0),
            TypeNode::FnPtr(method) => std::iter::once(&method.return_type)
                .chain(&method.params)
                .map(TypeNode::depth)
                .max()
                .unwrap_or(0),
        };
        children + 1
    }
}

impl From<PrimitiveKind> for TypeNode {
    fn from(kind: PrimitiveKind) -> Self {
        TypeNode::Primitive(kind)
    }
}

/// The calling convention kind of a method signature (II.23.2.3, II.15.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum CallingConvention {
    /// Managed default convention
    #[default]
    #[strum(serialize = "default")]
    Default = 0x00,
    /// Native `cdecl`
    #[strum(serialize = "unmanaged cdecl")]
    C = 0x01,
    /// Native `stdcall`
    #[strum(serialize = "unmanaged stdcall")]
    StdCall = 0x02,
    /// Native `thiscall`
    #[strum(serialize = "unmanaged thiscall")]
    ThisCall = 0x03,
    /// Native `fastcall`
    #[strum(serialize = "unmanaged fastcall")]
    FastCall = 0x04,
    /// Managed variable argument list
    #[strum(serialize = "vararg")]
    VarArg = 0x05,
    /// Native convention selected by modifiers on the return type
    #[strum(serialize = "unmanaged")]
    Unmanaged = 0x09,
}

impl CallingConvention {
    /// Returns `true` if signatures with this convention may carry a vararg sentinel.
    #[must_use]
    pub fn allows_varargs(self) -> bool {
        matches!(self, CallingConvention::VarArg | CallingConvention::C)
    }
}

/// A method signature: `MethodDefSig`, `MethodRefSig` or `StandAloneMethodSig` (II.23.2.1 - II.23.2.3)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MethodSignature {
    /// The calling convention kind
    pub calling_convention: CallingConvention,
    /// An instance method (`instance` keyword, §II.15.3)
    pub has_this: bool,
    /// The `this` pointer is the first explicit parameter (`explicit` keyword, §II.15.3)
    pub explicit_this: bool,
    /// The generic flag was set; `generic_param_count` was encoded
    pub generic: bool,
    /// Number of generic parameters, 0 if the method is not generic
    pub generic_param_count: u32,
    /// The return type
    pub return_type: TypeNode,
    /// All parameters, fixed and vararg, in encoded order
    pub params: Vec<TypeNode>,
    /// Index into `params` at which the vararg-only parameters start
    pub sentinel: Option<usize>,
}

impl Default for TypeNode {
    fn default() -> Self {
        TypeNode::Primitive(PrimitiveKind::Void)
    }
}

impl MethodSignature {
    /// The flag bits of the encoded first byte.
    #[must_use]
    pub fn flags(&self) -> SignatureFlags {
        let mut flags = SignatureFlags::empty();
        flags.set(SignatureFlags::GENERIC, self.generic);
        flags.set(SignatureFlags::HAS_THIS, self.has_this);
        flags.set(SignatureFlags::EXPLICIT_THIS, self.explicit_this);
        flags
    }

    /// The encoded first byte: calling convention kind and flag bits.
    #[must_use]
    pub fn header_byte(&self) -> u8 {
        self.calling_convention as u8 | self.flags().bits()
    }

    /// Parameters declared by the method itself (before any sentinel).
    #[must_use]
    pub fn fixed_params(&self) -> &[TypeNode] {
        &self.params[..self.vararg_start()]
    }

    /// Parameters supplied only at a vararg call site (after the sentinel).
    #[must_use]
    pub fn vararg_params(&self) -> &[TypeNode] {
        &self.params[self.vararg_start()..]
    }

    fn vararg_start(&self) -> usize {
        self.sentinel
            .map_or(self.params.len(), |index| index.min(self.params.len()))
    }
}

/// Field signature (II.23.2.4)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldSignature {
    /// The type of the field, including its custom modifiers
    pub field_type: TypeNode,
}

/// Property signature (II.23.2.5)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PropertySignature {
    /// Indicates the passing of a 'this' pointer
    pub has_this: bool,
    /// The type of this property, including its custom modifiers
    pub property_type: TypeNode,
    /// The index parameters of this property
    pub params: Vec<TypeNode>,
}

/// Local variable signature (II.23.2.6)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LocalVariableSignature {
    /// The local variables; `pinned` and `byref` locals keep their wrappers
    pub locals: Vec<TypeNode>,
}

/// Type specification signature (II.23.2.14)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TypeSpecSignature {
    /// Signature of this type
    pub base: TypeNode,
}

/// Method instantiation signature (II.23.2.15)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MethodSpecSignature {
    /// Types of the generic arguments
    pub generic_args: Vec<TypeNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn test_primitive_table() {
        assert_eq!(PrimitiveKind::COUNT, 18);

        for kind in PrimitiveKind::iter() {
            assert_eq!(
                PrimitiveKind::from_element_type(kind.element_type()),
                Some(kind)
            );
        }

        for byte in [
            ELEMENT_TYPE::END,
            ELEMENT_TYPE::PTR,
            ELEMENT_TYPE::CLASS,
            0x17,
            0x1A,
            ELEMENT_TYPE::SENTINEL,
        ] {
            assert_eq!(PrimitiveKind::from_element_type(byte), None);
        }
    }

    #[test]
    fn test_primitive_names() {
        assert_eq!(PrimitiveKind::I4.to_string(), "int32");
        assert_eq!(PrimitiveKind::I.to_string(), "native int");
        assert_eq!(PrimitiveKind::I4.system_name(), "System.Int32");
        assert_eq!(PrimitiveKind::U1.system_name(), "System.Byte");
        assert_eq!(PrimitiveKind::TypedByRef.system_name(), "System.TypedReference");
    }

    #[test]
    fn test_unmodified_and_pinned() {
        let node = TypeNode::modified(
            Token::new(0x0100_0001),
            true,
            TypeNode::pinned(TypeNode::Primitive(PrimitiveKind::I4)),
        );

        assert!(node.is_pinned());
        assert_eq!(node.unmodified(), &TypeNode::Primitive(PrimitiveKind::I4));
        assert!(!TypeNode::by_ref(TypeNode::pinned(PrimitiveKind::I4.into())).is_pinned());
    }

    #[test]
    fn test_depth() {
        assert_eq!(TypeNode::Primitive(PrimitiveKind::I4).depth(), 1);
        assert_eq!(
            TypeNode::sz_array(TypeNode::ptr(PrimitiveKind::U1.into())).depth(),
            3
        );

        let inst = TypeNode::GenericInst(GenericInstance {
            base: Token::new(0x0100_0001),
            value_type: false,
            args: vec![
                PrimitiveKind::I4.into(),
                TypeNode::sz_array(PrimitiveKind::String.into()),
            ],
        });
        assert_eq!(inst.depth(), 3);
    }

    #[test]
    fn test_method_header_and_params() {
        let method = MethodSignature {
            calling_convention: CallingConvention::VarArg,
            has_this: true,
            params: vec![
                PrimitiveKind::I4.into(),
                PrimitiveKind::String.into(),
                PrimitiveKind::R8.into(),
            ],
            sentinel: Some(1),
            ..Default::default()
        };

        assert_eq!(method.header_byte(), 0x25);
        assert_eq!(method.fixed_params(), &[TypeNode::Primitive(PrimitiveKind::I4)]);
        assert_eq!(method.vararg_params().len(), 2);

        let method = MethodSignature {
            generic: true,
            generic_param_count: 1,
            params: vec![PrimitiveKind::I4.into()],
            ..Default::default()
        };
        assert_eq!(method.header_byte(), 0x10);
        assert_eq!(method.fixed_params().len(), 1);
        assert!(method.vararg_params().is_empty());
    }

    #[test]
    fn test_calling_convention() {
        assert_eq!(CallingConvention::from_repr(5), Some(CallingConvention::VarArg));
        assert_eq!(CallingConvention::from_repr(6), None);
        assert!(CallingConvention::VarArg.allows_varargs());
        assert!(!CallingConvention::Default.allows_varargs());
        assert_eq!(CallingConvention::StdCall.to_string(), "unmanaged stdcall");
    }
}
