//! Grammar check for `Signature` attribute contents (JVMS 4.7.9.1)

/// `ClassSignature: [TypeParameters] SuperclassSignature {SuperinterfaceSignature}`
pub fn is_valid_class_signature(s: &str) -> bool {
    let mut p = Parser::new(s);
    if p.peek() == Some('<') && !p.parse_type_parameters() {
        return false;
    }
    if !p.parse_class_type_signature() {
        return false;
    }
    while p.more() {
        if !p.parse_class_type_signature() {
            return false;
        }
    }
    p.eof()
}

/// `JavaTypeSignature`: a reference type signature or a base type
pub fn is_valid_field_signature(s: &str) -> bool {
    let mut p = Parser::new(s);
    p.parse_field_type_signature_or_base() && p.eof()
}

/// `MethodSignature: [TypeParameters] ( {JavaTypeSignature} ) Result {ThrowsSignature}`
pub fn is_valid_method_signature(s: &str) -> bool {
    let mut p = Parser::new(s);
    if p.peek() == Some('<') && !p.parse_type_parameters() {
        return false;
    }
    if !p.consume('(') {
        return false;
    }
    while p.peek() != Some(')') {
        if !p.parse_field_type_signature_or_base() {
            return false;
        }
    }
    p.next();
    if !p.consume('V') && !p.parse_field_type_signature_or_base() {
        return false;
    }
    while p.consume('^') {
        let ok = match p.peek() {
            Some('T') => p.parse_type_variable_signature(),
            _ => p.parse_class_type_signature(),
        };
        if !ok {
            return false;
        }
    }
    p.eof()
}

struct Parser<'a> {
    chars: std::str::Chars<'a>,
    look: Option<char>,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Self {
        let mut chars = s.chars();
        let look = chars.next();
        Self { chars, look }
    }

    fn peek(&self) -> Option<char> {
        self.look
    }

    fn next(&mut self) -> Option<char> {
        let current = self.look;
        self.look = self.chars.next();
        current
    }

    fn consume(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.next();
            true
        } else {
            false
        }
    }

    fn eof(&self) -> bool {
        self.look.is_none()
    }

    fn more(&self) -> bool {
        self.look.is_some()
    }

    fn parse_identifier(&mut self) -> bool {
        let mut seen = false;
        while let Some(c) = self.peek() {
            if matches!(c, '/' | ';' | '<' | '>' | ':' | '.' | '[') {
                break;
            }
            seen = true;
            self.next();
        }
        seen
    }

    fn parse_type_parameters(&mut self) -> bool {
        if !self.consume('<') {
            return false;
        }
        // at least one parameter
        if self.peek() == Some('>') {
            return false;
        }
        while !self.consume('>') {
            if !self.parse_identifier() || !self.consume(':') {
                return false;
            }
            // class bound may be empty when interface bounds follow
            if self.peek() != Some(':') && self.peek() != Some('>') && !self.parse_field_type_signature() {
                return false;
            }
            while self.consume(':') {
                if !self.parse_field_type_signature() {
                    return false;
                }
            }
            if self.eof() {
                return false;
            }
        }
        true
    }

    fn parse_field_type_signature_or_base(&mut self) -> bool {
        match self.peek() {
            Some('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z') => {
                self.next();
                true
            }
            _ => self.parse_field_type_signature(),
        }
    }

    fn parse_field_type_signature(&mut self) -> bool {
        match self.peek() {
            Some('L') => self.parse_class_type_signature(),
            Some('T') => self.parse_type_variable_signature(),
            Some('[') => {
                self.next();
                self.parse_field_type_signature_or_base()
            }
            _ => false,
        }
    }

    fn parse_type_variable_signature(&mut self) -> bool {
        self.consume('T') && self.parse_identifier() && self.consume(';')
    }

    fn parse_class_type_signature(&mut self) -> bool {
        if !self.consume('L') || !self.parse_simple_class_type_signature() {
            return false;
        }
        // inner classes
        while self.consume('.') {
            if !self.parse_simple_class_type_signature() {
                return false;
            }
        }
        self.consume(';')
    }

    /// Package segments separated by `/`, each optionally followed by type arguments
    fn parse_simple_class_type_signature(&mut self) -> bool {
        loop {
            if !self.parse_identifier() {
                return false;
            }
            if self.peek() == Some('<') && !self.parse_type_arguments() {
                return false;
            }
            if !self.consume('/') {
                return true;
            }
        }
    }

    fn parse_type_arguments(&mut self) -> bool {
        if !self.consume('<') {
            return false;
        }
        loop {
            let ok = match self.peek() {
                Some('*') => {
                    self.next();
                    true
                }
                Some('+' | '-') => {
                    self.next();
                    self.parse_field_type_signature()
                }
                _ => self.parse_field_type_signature(),
            };
            if !ok {
                return false;
            }
            if self.consume('>') {
                return true;
            }
        }
    }
}
