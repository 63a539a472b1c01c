//! 导入语句改写
//!
//! 用三条正则扫描源码中的 `import` 声明，把每条声明替换成从模块注册表取值的局部绑定。
//! 这里不做真正的语法分析：混合形式、仅类型导入、重新导出、动态 `import()` 都会原样保留，
//! 留到执行阶段报错。

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// 改写后的代码通过这个标识符访问模块注册表
pub const REGISTRY_IDENT: &str = "__modules";

/// `import { a, b as c } from 'm'`
static NAMED_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s*\{([^}]*)\}\s*from\s*(['"][^'"]*['"])"#).expect("named import pattern")
});

/// `import X from 'm'`
static DEFAULT_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+([^{}\s,]+)\s+from\s+(['"][^'"]*['"])"#).expect("default import pattern")
});

/// `import * as X from 'm'`
static NAMESPACE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+\*\s+as\s+([^\s,]+)\s+from\s+(['"][^'"]*['"])"#)
        .expect("namespace import pattern")
});

/// 导入形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportForm {
    Named,
    Default,
    Namespace,
}

/// 单个导入项 (导出名, 本地名)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub imported: String,
    pub local: String,
}

/// 匹配到的一条导入声明
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    pub form: ImportForm,
    pub bindings: Vec<ImportBinding>,
    pub module_id: String,
    /// 原始声明文本，替换时按它做精确子串匹配
    pub text: String,
    /// 在原始源码中的位置
    pub span: Range<usize>,
}

impl ImportDeclaration {
    /// 生成替换文本：每个绑定一条 `const` 语句
    pub fn to_bindings(&self) -> String {
        let mut out = String::new();
        for binding in &self.bindings {
            match self.form {
                ImportForm::Named => out.push_str(&format!(
                    "const {} = {}['{}']['{}'];\n",
                    binding.local, REGISTRY_IDENT, self.module_id, binding.imported
                )),
                // 默认导入和命名空间导入都绑定整个模块对象，而不是 `.default`
                ImportForm::Default | ImportForm::Namespace => out.push_str(&format!(
                    "const {} = {}['{}'];\n",
                    binding.local, REGISTRY_IDENT, self.module_id
                )),
            }
        }
        out
    }
}

/// 改写结果
#[derive(Debug, Clone, PartialEq)]
pub struct RewrittenSource {
    pub text: String,
    /// 按源码位置排序
    pub imports: Vec<ImportDeclaration>,
}

/// 导入改写器
pub struct ImportRewriter;

impl ImportRewriter {
    /// 扫描并替换全部可识别的导入声明
    pub fn rewrite(source: &str) -> RewrittenSource {
        let mut found = Vec::new();
        Self::scan(source, &NAMED_IMPORT, ImportForm::Named, &mut found);
        Self::scan(source, &DEFAULT_IMPORT, ImportForm::Default, &mut found);
        Self::scan(source, &NAMESPACE_IMPORT, ImportForm::Namespace, &mut found);

        // 按收集顺序逐条替换第一次出现的位置，重复的相同声明会依次被替换
        let mut text = source.to_string();
        for decl in &found {
            text = text.replacen(&decl.text, &decl.to_bindings(), 1);
        }

        found.sort_by_key(|decl| decl.span.start);
        tracing::debug!(imports = found.len(), "imports rewritten");

        RewrittenSource { text, imports: found }
    }

    fn scan(source: &str, pattern: &Regex, form: ImportForm, out: &mut Vec<ImportDeclaration>) {
        for caps in pattern.captures_iter(source) {
            let (Some(whole), Some(items), Some(module)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let module_id = module.as_str().replace(['\'', '"'], "");

            let bindings = match form {
                ImportForm::Named => Self::split_named(items.as_str()),
                ImportForm::Default => vec![ImportBinding {
                    imported: "default".to_string(),
                    local: items.as_str().to_string(),
                }],
                ImportForm::Namespace => vec![ImportBinding {
                    imported: "*".to_string(),
                    local: items.as_str().to_string(),
                }],
            };

            out.push(ImportDeclaration {
                form,
                bindings,
                module_id,
                text: whole.as_str().to_string(),
                span: whole.range(),
            });
        }
    }

    /// 拆分 `{ a, b as c }` 中的导入项
    fn split_named(items: &str) -> Vec<ImportBinding> {
        items
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                let words: Vec<&str> = item.split_whitespace().collect();
                match words.as_slice() {
                    [name] => ImportBinding {
                        imported: name.to_string(),
                        local: name.to_string(),
                    },
                    [name, "as", alias] => ImportBinding {
                        imported: name.to_string(),
                        local: alias.to_string(),
                    },
                    // 无法识别的写法原样输出，执行时报错
                    _ => ImportBinding {
                        imported: item.to_string(),
                        local: item.to_string(),
                    },
                }
            })
            .collect()
    }
}

/// 源码中是否还残留改写器能识别的导入
pub fn has_rewritable_imports(source: &str) -> bool {
    NAMED_IMPORT.is_match(source) || DEFAULT_IMPORT.is_match(source) || NAMESPACE_IMPORT.is_match(source)
}
