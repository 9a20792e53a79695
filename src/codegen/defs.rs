//! Generic classfile-specific definitions

/// Header of Java class file (magic number)
pub const MAGIC: u32 = 0xCAFEBABE;

/// Name of a constructor
pub const CONSTRUCTOR_METHOD_NAME: &str = "<init>";

/// Descriptor of a no-argument constructor
pub const NO_ARG_CONSTRUCTOR_DESCRIPTOR: &str = "()V";

/// Attribute names emitted by the encoder or checked by the verifier
pub mod attribute_names {
    pub const BOOTSTRAP_METHODS: &str = "BootstrapMethods";
    pub const CODE: &str = "Code";
    pub const CONSTANT_VALUE: &str = "ConstantValue";
    pub const STACK_MAP_TABLE: &str = "StackMapTable";
    pub const SIGNATURE: &str = "Signature";
    pub const SOURCE_FILE: &str = "SourceFile";
}

/// JVM version constants
///
/// Stack map frames are mandatory from Java 7 on and understood from Java 6,
/// so nothing older is emitted.
pub mod major_versions {
    pub const JAVA_6_0: u16 = 50;
    pub const JAVA_7: u16 = 51;
    pub const JAVA_8: u16 = 52;
    pub const JAVA_11: u16 = 55;
    pub const JAVA_17: u16 = 61;
    pub const JAVA_21: u16 = 65;
}
