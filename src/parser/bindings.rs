//! 顶层声明扫描
//!
//! 沙箱结尾需要显式返回所有顶层名字，所以这里按词法粗略找出处于最外层的
//! `function` / `class` / `const` / `let` / `var` 声明。会跳过字符串、模板字符串、正则字面量和注释。
//! 一条变量声明中的多个声明项都会收集。

/// 声明种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Function,
    Class,
    Variable,
}

/// 顶层声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevelDeclaration {
    pub name: String,
    pub kind: DeclarationKind,
}

/// 顶层声明扫描器
pub struct DeclarationScanner {
    input: Vec<char>,
    pos: usize,
    brace_depth: usize,
    paren_depth: usize,
    bracket_depth: usize,
}

impl DeclarationScanner {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            brace_depth: 0,
            paren_depth: 0,
            bracket_depth: 0,
        }
    }

    /// 按出现顺序返回去重后的顶层声明
    pub fn scan(mut self) -> Vec<TopLevelDeclaration> {
        let mut found: Vec<TopLevelDeclaration> = Vec::new();

        while self.pos < self.input.len() {
            let c = self.current_char();

            if self.starts_with("//") {
                self.skip_line_comment();
                continue;
            }
            if self.starts_with("/*") {
                self.skip_block_comment();
                continue;
            }

            match c {
                '\'' | '"' => self.skip_string(c),
                '`' => self.skip_template(),
                '/' if self.regex_allowed() => self.skip_regex(),
                '{' => {
                    self.brace_depth += 1;
                    self.pos += 1;
                }
                '}' => {
                    self.brace_depth = self.brace_depth.saturating_sub(1);
                    self.pos += 1;
                }
                '(' => {
                    self.paren_depth += 1;
                    self.pos += 1;
                }
                ')' => {
                    self.paren_depth = self.paren_depth.saturating_sub(1);
                    self.pos += 1;
                }
                '[' => {
                    self.bracket_depth += 1;
                    self.pos += 1;
                }
                ']' => {
                    self.bracket_depth = self.bracket_depth.saturating_sub(1);
                    self.pos += 1;
                }
                c if is_ident_start(c) => {
                    let after_dot = self.previous_significant_char() == Some('.');
                    let word = self.read_identifier();
                    if after_dot || !self.at_top_level() {
                        continue;
                    }
                    for decl in self.declarations_after(&word) {
                        if !found.iter().any(|d| d.name == decl.name) {
                            found.push(decl);
                        }
                    }
                }
                _ => self.pos += 1,
            }
        }

        found
    }

    fn at_top_level(&self) -> bool {
        self.brace_depth == 0 && self.paren_depth == 0 && self.bracket_depth == 0
    }

    /// 关键字之后读取声明名
    fn declarations_after(&mut self, keyword: &str) -> Vec<TopLevelDeclaration> {
        let kind = match keyword {
            "function" => DeclarationKind::Function,
            "class" => DeclarationKind::Class,
            "const" | "let" | "var" => DeclarationKind::Variable,
            _ => return Vec::new(),
        };

        if kind != DeclarationKind::Variable {
            self.skip_whitespace();
            if kind == DeclarationKind::Function && self.current_char() == '*' {
                self.pos += 1;
                self.skip_whitespace();
            }
            return self.read_declared_name().map(|name| TopLevelDeclaration { name, kind }).into_iter().collect();
        }

        // `const a = 1, b = 2;` 逐个声明项读取
        let mut out = Vec::new();
        loop {
            self.skip_trivia();
            if let Some(name) = self.read_declared_name() {
                out.push(TopLevelDeclaration { name, kind });
            }
            if !self.skip_initializer() {
                break;
            }
        }
        out
    }

    /// 解构声明返回 None
    fn read_declared_name(&mut self) -> Option<String> {
        if !is_ident_start(self.current_char()) {
            return None;
        }
        let name = self.read_identifier();
        (!is_reserved(&name)).then_some(name)
    }

    /// 跳过当前声明项的剩余部分；停在同层的 `,` 之后返回 true，遇到 `;`、换行或闭合括号时返回 false
    fn skip_initializer(&mut self) -> bool {
        let mut depth = 0usize;
        while self.pos < self.input.len() {
            if self.starts_with("//") {
                self.skip_line_comment();
                continue;
            }
            if self.starts_with("/*") {
                self.skip_block_comment();
                continue;
            }
            let c = self.input[self.pos];
            match c {
                '\'' | '"' => self.skip_string(c),
                '`' => self.skip_template(),
                '/' if self.regex_allowed() => self.skip_regex(),
                '(' | '[' | '{' => {
                    depth += 1;
                    self.pos += 1;
                }
                ')' | ']' | '}' => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                    self.pos += 1;
                }
                ',' if depth == 0 => {
                    self.pos += 1;
                    return true;
                }
                ';' | '\n' if depth == 0 => return false,
                _ => self.pos += 1,
            }
        }
        false
    }

    /// `/` 出现在运算符、开括号、分隔符或特定关键字之后时是正则字面量的开头
    fn regex_allowed(&self) -> bool {
        let before = self.input[..self.pos].iter().rev().position(|c| !c.is_whitespace());
        let Some(offset) = before else {
            return true;
        };
        let end = self.pos - offset;
        let prev = self.input[end - 1];
        if is_ident_part(prev) {
            let start = self.input[..end].iter().rposition(|c| !is_ident_part(*c)).map_or(0, |i| i + 1);
            let word: String = self.input[start..end].iter().collect();
            return matches!(
                word.as_str(),
                "return" | "typeof" | "case" | "in" | "of" | "new" | "delete" | "void" | "throw" | "yield" | "await"
            );
        }
        matches!(
            prev,
            '(' | ',' | '=' | ':' | '[' | '!' | '&' | '|' | '?' | '{' | '}' | ';' | '+' | '-' | '*' | '%' | '<'
                | '>' | '~' | '^'
        )
    }

    /// 正则字面量，包括字符类 `[...]`、转义和结尾的标志
    fn skip_regex(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                '\\' => self.pos += 2,
                '[' => {
                    in_class = true;
                    self.pos += 1;
                }
                ']' => {
                    in_class = false;
                    self.pos += 1;
                }
                '/' if !in_class => {
                    self.pos += 1;
                    while self.pos < self.input.len() && is_ident_part(self.input[self.pos]) {
                        self.pos += 1;
                    }
                    return;
                }
                // 跨行说明不是正则，按单个字符处理
                '\n' => {
                    self.pos = start + 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.input.len());
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.input.len() && is_ident_part(self.input[self.pos]) {
            self.pos += 1;
        }
        self.input[start..self.pos].iter().collect()
    }

    fn previous_significant_char(&self) -> Option<char> {
        self.input[..self.pos].iter().rev().find(|c| !c.is_whitespace()).copied()
    }

    fn skip_string(&mut self, quote: char) {
        self.pos += 1;
        while self.pos < self.input.len() {
            let c = self.input[self.pos];
            if c == '\\' {
                self.pos += 2;
                continue;
            }
            self.pos += 1;
            if c == quote || c == '\n' {
                break;
            }
        }
    }

    /// 模板字符串，`${}` 内部可能再嵌套字符串或模板
    fn skip_template(&mut self) {
        self.pos += 1;
        while self.pos < self.input.len() {
            let c = self.input[self.pos];
            if c == '\\' {
                self.pos += 2;
                continue;
            }
            if c == '`' {
                self.pos += 1;
                return;
            }
            if self.starts_with("${") {
                self.pos += 2;
                self.skip_interpolation();
                continue;
            }
            self.pos += 1;
        }
    }

    fn skip_interpolation(&mut self) {
        let mut depth = 1usize;
        while self.pos < self.input.len() {
            let c = self.input[self.pos];
            match c {
                '\'' | '"' => self.skip_string(c),
                '`' => self.skip_template(),
                '{' => {
                    depth += 1;
                    self.pos += 1;
                }
                '}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => self.pos += 1,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos] != '\n' {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.input.len() && !self.starts_with("*/") {
            self.pos += 1;
        }
        self.pos = (self.pos + 2).min(self.input.len());
    }

    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if self.starts_with("//") {
                self.skip_line_comment();
            } else if self.starts_with("/*") {
                self.skip_block_comment();
            } else {
                return;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn current_char(&self) -> char {
        self.input.get(self.pos).copied().unwrap_or('\0')
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut i = self.pos;
        for c in s.chars() {
            if self.input.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_reserved(word: &str) -> bool {
    matches!(
        word,
        "function" | "class" | "const" | "let" | "var" | "return" | "new" | "typeof" | "await" | "yield"
    )
}

/// 扫描源码中的顶层声明
pub fn top_level_declarations(source: &str) -> Vec<TopLevelDeclaration> {
    DeclarationScanner::new(source).scan()
}
