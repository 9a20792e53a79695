/// Java bytecode instruction opcodes
///
/// Only the instructions an accessor class needs are named here. Values follow
/// the Java Virtual Machine Specification.

// 0x15 - 0x2D: Loads
pub const ILOAD: u8 = 0x15;
pub const LLOAD: u8 = 0x16;
pub const FLOAD: u8 = 0x17;
pub const DLOAD: u8 = 0x18;
pub const ALOAD: u8 = 0x19;
pub const ILOAD_0: u8 = 0x1a;
pub const ILOAD_1: u8 = 0x1b;
pub const ILOAD_2: u8 = 0x1c;
pub const ILOAD_3: u8 = 0x1d;
pub const LLOAD_0: u8 = 0x1e;
pub const LLOAD_1: u8 = 0x1f;
pub const LLOAD_2: u8 = 0x20;
pub const LLOAD_3: u8 = 0x21;
pub const FLOAD_0: u8 = 0x22;
pub const FLOAD_1: u8 = 0x23;
pub const FLOAD_2: u8 = 0x24;
pub const FLOAD_3: u8 = 0x25;
pub const DLOAD_0: u8 = 0x26;
pub const DLOAD_1: u8 = 0x27;
pub const DLOAD_2: u8 = 0x28;
pub const DLOAD_3: u8 = 0x29;
pub const ALOAD_0: u8 = 0x2a;
pub const ALOAD_1: u8 = 0x2b;
pub const ALOAD_2: u8 = 0x2c;
pub const ALOAD_3: u8 = 0x2d;

// 0x59: Stack operations
pub const DUP: u8 = 0x59;

// 0xAC - 0xB1: Returns
pub const IRETURN: u8 = 0xac;
pub const LRETURN: u8 = 0xad;
pub const FRETURN: u8 = 0xae;
pub const DRETURN: u8 = 0xaf;
pub const ARETURN: u8 = 0xb0;
pub const RETURN: u8 = 0xb1;

// 0xB4 - 0xBF: References and object operations
pub const GETFIELD: u8 = 0xb4;
pub const PUTFIELD: u8 = 0xb5;
pub const INVOKESPECIAL: u8 = 0xb7;
pub const NEW: u8 = 0xbb;
pub const ATHROW: u8 = 0xbf;

// 0xC7: Extended branches
pub const IFNONNULL: u8 = 0xc7;

/// Lower-case mnemonic of a known opcode
pub fn opcode_name(opcode: u8) -> Option<&'static str> {
    let name = match opcode {
        ILOAD => "iload",
        LLOAD => "lload",
        FLOAD => "fload",
        DLOAD => "dload",
        ALOAD => "aload",
        ILOAD_0 => "iload_0",
        ILOAD_1 => "iload_1",
        ILOAD_2 => "iload_2",
        ILOAD_3 => "iload_3",
        LLOAD_0 => "lload_0",
        LLOAD_1 => "lload_1",
        LLOAD_2 => "lload_2",
        LLOAD_3 => "lload_3",
        FLOAD_0 => "fload_0",
        FLOAD_1 => "fload_1",
        FLOAD_2 => "fload_2",
        FLOAD_3 => "fload_3",
        DLOAD_0 => "dload_0",
        DLOAD_1 => "dload_1",
        DLOAD_2 => "dload_2",
        DLOAD_3 => "dload_3",
        ALOAD_0 => "aload_0",
        ALOAD_1 => "aload_1",
        ALOAD_2 => "aload_2",
        ALOAD_3 => "aload_3",
        DUP => "dup",
        IRETURN => "ireturn",
        LRETURN => "lreturn",
        FRETURN => "freturn",
        DRETURN => "dreturn",
        ARETURN => "areturn",
        RETURN => "return",
        GETFIELD => "getfield",
        PUTFIELD => "putfield",
        INVOKESPECIAL => "invokespecial",
        NEW => "new",
        ATHROW => "athrow",
        IFNONNULL => "ifnonnull",
        _ => return None,
    };
    Some(name)
}

/// Number of operand bytes following a known opcode
pub fn operand_count(opcode: u8) -> Option<usize> {
    match opcode {
        ILOAD | LLOAD | FLOAD | DLOAD | ALOAD => Some(1),
        GETFIELD | PUTFIELD | INVOKESPECIAL | NEW | IFNONNULL => Some(2),
        _ => opcode_name(opcode).map(|_| 0),
    }
}
