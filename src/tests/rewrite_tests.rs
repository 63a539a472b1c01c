//! 导入改写与顶层声明扫描测试

use crate::parser::imports::has_rewritable_imports;
use crate::parser::{top_level_declarations, DeclarationKind, ImportForm, ImportRewriter};

/// 辅助函数：只取改写后的文本
fn rewrite(source: &str) -> String {
    ImportRewriter::rewrite(source).text
}

/// 辅助函数：顶层声明名
fn names(source: &str) -> Vec<String> {
    top_level_declarations(source).into_iter().map(|d| d.name).collect()
}

/// 测试命名导入与别名
#[test]
fn test_named_import_with_alias() {
    let source = "import { useState, useEffect as onMount } from 'react';\nfunction Widget() { return null; }";
    let rewritten = ImportRewriter::rewrite(source);

    assert!(rewritten.text.contains("const useState = __modules['react']['useState'];\n"));
    assert!(rewritten.text.contains("const onMount = __modules['react']['useEffect'];\n"));
    assert!(!rewritten.text.contains("import"));
    assert!(rewritten.text.contains("function Widget() { return null; }"));

    assert_eq!(rewritten.imports.len(), 1);
    let decl = &rewritten.imports[0];
    assert_eq!(decl.form, ImportForm::Named);
    assert_eq!(decl.module_id, "react");
    assert_eq!(decl.bindings.len(), 2);
    assert_eq!(decl.bindings[1].imported, "useEffect");
    assert_eq!(decl.bindings[1].local, "onMount");
}

/// 测试多行命名导入，末尾逗号被忽略
#[test]
fn test_multiline_named_import() {
    let source = "import {\n    Button,\n    Box,\n} from \"@mui/material\";";
    let text = rewrite(source);

    assert!(text.contains("const Button = __modules['@mui/material']['Button'];"));
    assert!(text.contains("const Box = __modules['@mui/material']['Box'];"));
    assert_eq!(text.matches("const ").count(), 2);
}

/// 测试默认导入绑定整个模块对象
#[test]
fn test_default_import_binds_module_object() {
    let text = rewrite("import DeleteIcon from '@mui/icons-material/Delete';");
    assert_eq!(text, "const DeleteIcon = __modules['@mui/icons-material/Delete'];\n;");
}

/// 测试命名空间导入
#[test]
fn test_namespace_import() {
    let rewritten = ImportRewriter::rewrite("import * as Mui from '@mui/material';");
    assert_eq!(rewritten.text, "const Mui = __modules['@mui/material'];\n;");
    assert_eq!(rewritten.imports[0].form, ImportForm::Namespace);
    assert_eq!(rewritten.imports[0].bindings[0].local, "Mui");
}

/// 测试多种导入混排时各自在原位置替换
#[test]
fn test_mixed_declarations_replaced_in_place() {
    let source = "import React from 'react';\nimport { Box } from '@mui/material';\nimport * as Icons from 'lucide-react';\nconst x = 1;";
    let rewritten = ImportRewriter::rewrite(source);
    let text = &rewritten.text;

    let react = text.find("const React = __modules['react'];").expect("default import");
    let box_ = text.find("const Box = __modules['@mui/material']['Box'];").expect("named import");
    let icons = text.find("const Icons = __modules['lucide-react'];").expect("namespace import");
    assert!(react < box_ && box_ < icons);
    assert!(text.ends_with("const x = 1;"));

    // 结果按源码位置排序，而不是按收集顺序
    let forms: Vec<ImportForm> = rewritten.imports.iter().map(|d| d.form).collect();
    assert_eq!(forms, vec![ImportForm::Default, ImportForm::Named, ImportForm::Namespace]);
}

/// 测试重复的相同声明都会被替换
#[test]
fn test_duplicate_declarations_each_replaced() {
    let source = "import { useState } from 'react';\nimport { useState } from 'react';\n";
    let rewritten = ImportRewriter::rewrite(source);

    assert_eq!(rewritten.imports.len(), 2);
    assert!(!rewritten.text.contains("import"));
    assert_eq!(rewritten.text.matches("const useState = __modules['react']['useState'];").count(), 2);
}

/// 测试没有导入的源码保持不变
#[test]
fn test_source_without_imports_unchanged() {
    let source = "// importing nothing\nfunction Widget() {\n  return React.createElement('div', null, 'import');\n}\n";
    let rewritten = ImportRewriter::rewrite(source);
    assert_eq!(rewritten.text, source);
    assert!(rewritten.imports.is_empty());
}

/// 测试改写结果再次改写不变
#[test]
fn test_rewrite_is_idempotent() {
    let source = "import React from 'react';\nimport { Typography } from '@mui/material';\nfunction Widget() { return null; }";
    let once = rewrite(source);
    assert!(!has_rewritable_imports(&once));
    assert_eq!(rewrite(&once), once);
}

/// 测试无法识别的写法原样保留
#[test]
fn test_unsupported_forms_left_untouched() {
    let cases = [
        "import React, { useState } from 'react';",
        "import type { Props } from './types';",
        "import './styles.css';",
        "export { Box } from '@mui/material';",
        "const lazy = import('./Widget');",
    ];
    for source in cases {
        assert_eq!(rewrite(source), source, "{}", source);
    }
}

/// 测试基本顶层声明
#[test]
fn test_collects_top_level_declarations() {
    let source = r#"
        function Header() { return null; }
        const count = 1;
        let label = 'x';
        class Panel extends React.Component {}
        var Widget = () => null;
        async function* stream() {}
    "#;
    assert_eq!(names(source), vec!["Header", "count", "label", "Panel", "Widget", "stream"]);

    let decls = top_level_declarations(source);
    assert_eq!(decls[0].kind, DeclarationKind::Function);
    assert_eq!(decls[3].kind, DeclarationKind::Class);
    assert_eq!(decls[4].kind, DeclarationKind::Variable);
}

/// 测试嵌套作用域中的声明不收集
#[test]
fn test_nested_declarations_skipped() {
    let source = r#"
        function Widget() {
            const [value, setValue] = useState(0);
            function handle() { let inner = 2; }
            return null;
        }
        if (true) { var hidden = 1; }
        const tail = (function () { const deep = 1; return deep; })();
    "#;
    assert_eq!(names(source), vec!["Widget", "tail"]);
}

/// 测试字符串、模板字符串和注释中的关键字不会被识别
#[test]
fn test_strings_and_comments_skipped() {
    let source = r#"
        // function Commented() {}
        /* class Blocked {} */
        const text = "function Quoted() {}";
        const single = 'const nope = 1';
        const tpl = `class Tpl {} ${ "const inner" } ${ `nested ${1}` } const after`;
        function Real() {}
    "#;
    assert_eq!(names(source), vec!["text", "single", "tpl", "Real"]);
}

/// 测试成员访问、解构和重复声明
#[test]
fn test_member_access_destructuring_and_duplicates() {
    let source = r#"
        const { a, b } = config;
        const [first] = list;
        obj.function = 1;
        var total = 1;
        var total = 2;
    "#;
    assert_eq!(names(source), vec!["total"]);
}

/// 测试导入产生的本地名不在声明中
#[test]
fn test_import_locals_are_not_declarations() {
    let source = "import React from 'react';\nimport { useState } from 'react';\nfunction Widget() {}";
    assert_eq!(names(source), vec!["Widget"]);
}

/// 测试正则字面量中的引号、括号和斜杠不干扰扫描
#[test]
fn test_regex_literals_skipped() {
    let source = "function clean(s){ return s.replace(/\"/g, ''); }\nfunction Widget(){ return null; }";
    assert_eq!(names(source), vec!["clean", "Widget"]);

    let source = "const re = /[{]/;\nfunction Widget(){ return null; }";
    assert_eq!(names(source), vec!["re", "Widget"]);

    let source = r#"
        const path = /\/(class|function) [/]`/gi;
        const tick = cond ? /'/ : /`/;
        function Widget() {}
    "#;
    assert_eq!(names(source), vec!["path", "tick", "Widget"]);
}

/// 测试除号不会被当成正则
#[test]
fn test_division_is_not_regex() {
    let source = "const half = total / 2, third = (total) / 3 / 1;\nconst ratio = a.b / c;\nfunction Widget() {}";
    assert_eq!(names(source), vec!["half", "third", "ratio", "Widget"]);
}

/// 测试一条声明中的多个变量
#[test]
fn test_multiple_declarators() {
    assert_eq!(names("const a = 1, Widget = () => null;"), vec!["a", "Widget"]);

    let source = r#"
        let x, y = { k: [1, 2] }, /* skip */ z = f(1, 2);
        var first = "a,b", { inner } = obj, last = `c,${d}`;
        const Card = () => null, Panel = function () { var nested = 1, deeper = 2; };
    "#;
    assert_eq!(names(source), vec!["x", "y", "z", "first", "last", "Card", "Panel"]);
}
