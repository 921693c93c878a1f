//! Reserved words.
//!
//! One table drives both directions: lexeme to [`Keyword`] during
//! identifier classification, and [`Keyword`] back to its spelling for
//! display and diagnostics.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant,)*
        }

        const KEYWORD_TABLE: &[(&str, Keyword)] = &[$(($text, Keyword::$variant),)*];

        impl Keyword {
            /// Source spelling of the keyword.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Auto => "auto",
    Break => "break",
    Case => "case",
    Char => "char",
    Const => "const",
    Continue => "continue",
    Default => "default",
    Do => "do",
    Double => "double",
    Else => "else",
    Enum => "enum",
    Extern => "extern",
    Float => "float",
    For => "for",
    Goto => "goto",
    If => "if",
    Inline => "inline",
    Int => "int",
    Long => "long",
    Register => "register",
    Restrict => "restrict",
    Return => "return",
    Short => "short",
    Signed => "signed",
    Sizeof => "sizeof",
    Static => "static",
    Struct => "struct",
    Switch => "switch",
    Typedef => "typedef",
    Typeof => "typeof",
    TypeofUnqual => "typeof_unqual",
    Union => "union",
    Unsigned => "unsigned",
    Void => "void",
    Volatile => "volatile",
    While => "while",
    Alignas => "_Alignas",
    Alignof => "_Alignof",
    Atomic => "_Atomic",
    Bool => "_Bool",
    Complex => "_Complex",
    Generic => "_Generic",
    Noreturn => "_Noreturn",
    C11StaticAssert => "_Static_assert",
    ThreadLocal => "_Thread_local",
    MsAsm => "__asm",
    MsBased => "__based",
    MsCdecl => "__cdecl",
    MsDeclspec => "__declspec",
    MsExcept => "__except",
    MsFastcall => "__fastcall",
    MsFinally => "__finally",
    MsInline => "__inline",
    MsInt16 => "__int16",
    MsInt32 => "__int32",
    MsInt64 => "__int64",
    MsInt8 => "__int8",
    MsLeave => "__leave",
    MsRestrict => "__restrict",
    MsStdcall => "__stdcall",
    MsTry => "__try",
    GnuTypeof => "__typeof__",
    GnuTypeofUnqual => "__typeof_unqual__",
    Dllexport => "dllexport",
    Dllimport => "dllimport",
    Naked => "naked",
    StaticAssert => "static_assert",
    Thread => "thread",
}

pub type KeywordMap = HashMap<&'static str, Keyword>;

static KEYWORDS: OnceLock<KeywordMap> = OnceLock::new();

/// The reserved-word map, built on first use and shared afterwards.
pub fn keyword_map() -> &'static KeywordMap {
    KEYWORDS.get_or_init(|| KEYWORD_TABLE.iter().copied().collect())
}

impl Keyword {
    pub fn lookup(word: &str) -> Option<Keyword> {
        keyword_map().get(word).copied()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_round_trips_every_entry() {
        assert_eq!(keyword_map().len(), KEYWORD_TABLE.len());
        for (text, kw) in KEYWORD_TABLE {
            assert_eq!(Keyword::lookup(text), Some(*kw));
            assert_eq!(kw.as_str(), *text);
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(Keyword::lookup("While"), None);
        assert_eq!(Keyword::lookup("INT"), None);
        assert_eq!(Keyword::lookup("int"), Some(Keyword::Int));
    }
}
