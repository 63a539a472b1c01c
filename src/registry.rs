//! 模块注册表目录
//!
//! 组件源码只能导入这里列出的模块。真正的导出对象在每次渲染时由宿主脚本
//! (`js::host`) 按这份目录现场构建，这里保留的是名字清单，供改写诊断、命令行和测试使用。

use serde::Serialize;

pub const REACT: &str = "react";
pub const REACT_DOM: &str = "react-dom";
pub const REACT_DOM_CLIENT: &str = "react-dom/client";
pub const MATERIAL: &str = "@mui/material";
pub const MATERIAL_STYLES: &str = "@mui/material/styles";
pub const MATERIAL_ICONS: &str = "@mui/icons-material";
pub const LUCIDE: &str = "lucide-react";

/// 宿主运行时模块的导出
pub const REACT_EXPORTS: &[&str] = &[
    "createElement",
    "Fragment",
    "Component",
    "PureComponent",
    "useState",
    "useReducer",
    "useEffect",
    "useLayoutEffect",
    "useRef",
    "useMemo",
    "useCallback",
    "createContext",
    "useContext",
    "memo",
    "forwardRef",
    "Children",
    "isValidElement",
    "version",
];

pub const REACT_DOM_EXPORTS: &[&str] = &["render", "createRoot", "createPortal", "flushSync"];

/// UI 组件库中预先包装的展示组件
pub const MATERIAL_COMPONENTS: &[&str] = &[
    "Box",
    "Button",
    "Typography",
    "Paper",
    "TextField",
    "CircularProgress",
    "Alert",
    "AlertTitle",
    "Divider",
    "Container",
    "Grid",
    "Card",
    "CardContent",
    "CardHeader",
    "CardActions",
    "Checkbox",
    "FormControl",
    "FormLabel",
    "FormControlLabel",
    "InputLabel",
    "Select",
    "MenuItem",
    "List",
    "ListItem",
    "ListItemText",
    "ListItemIcon",
    "ListItemButton",
    "Fab",
    "IconButton",
    "Tabs",
    "Tab",
    "Dialog",
    "DialogTitle",
    "DialogContent",
    "DialogActions",
    "LinearProgress",
    "Chip",
    "Avatar",
    "Tooltip",
    "Switch",
    "Stack",
    "Badge",
];

/// UI 组件库额外的主题相关导出
pub const MATERIAL_THEME_EXPORTS: &[&str] = &["ThemeProvider", "createTheme", "useTheme", "CssBaseline"];

pub const MATERIAL_ICON_NAMES: &[&str] = &[
    "Delete",
    "Add",
    "Check",
    "Close",
    "Edit",
    "PlayArrow",
    "Pause",
    "Refresh",
    "Settings",
    "Search",
    "Favorite",
    "FavoriteBorder",
    "Star",
    "StarBorder",
    "Info",
    "Warning",
    "Error",
    "CheckCircle",
    "Person",
    "ArrowUpward",
    "ArrowDownward",
];

/// 矢量图标，接收 size / color
pub const LUCIDE_ICON_NAMES: &[&str] = &["Clock", "Play", "Pause", "X", "Plus", "Save"];

/// 模块描述
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleEntry {
    pub id: String,
    pub exports: Vec<&'static str>,
}

impl ModuleEntry {
    fn new(id: &str, exports: Vec<&'static str>) -> Self {
        Self { id: id.to_string(), exports }
    }
}

/// 固定的模块目录
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    entries: Vec<ModuleEntry>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        let material: Vec<&'static str> = MATERIAL_COMPONENTS
            .iter()
            .chain(MATERIAL_THEME_EXPORTS)
            .copied()
            .chain(std::iter::once("icons"))
            .collect();

        let mut entries = vec![
            ModuleEntry::new(REACT, REACT_EXPORTS.to_vec()),
            ModuleEntry::new(REACT_DOM, REACT_DOM_EXPORTS.to_vec()),
            ModuleEntry::new(REACT_DOM_CLIENT, REACT_DOM_EXPORTS.to_vec()),
            ModuleEntry::new(MATERIAL, material),
            ModuleEntry::new(MATERIAL_STYLES, vec!["ThemeProvider", "createTheme", "useTheme"]),
            ModuleEntry::new(MATERIAL_ICONS, MATERIAL_ICON_NAMES.to_vec()),
            ModuleEntry::new(LUCIDE, LUCIDE_ICON_NAMES.to_vec()),
        ];
        // `import DeleteIcon from '@mui/icons-material/Delete'`：模块本身就是图标组件
        entries.extend(
            MATERIAL_ICON_NAMES
                .iter()
                .map(|name| ModuleEntry::new(&format!("{}/{}", MATERIAL_ICONS, name), Vec::new())),
        );
        Self { entries }
    }

    pub fn entries(&self) -> &[ModuleEntry] {
        &self.entries
    }

    pub fn is_known(&self, module_id: &str) -> bool {
        self.entries.iter().any(|e| e.id == module_id)
    }

    /// 模块的导出名；未知模块返回空集
    pub fn exports(&self, module_id: &str) -> &[&'static str] {
        self.entries
            .iter()
            .find(|e| e.id == module_id)
            .map(|e| e.exports.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_export(&self, module_id: &str, name: &str) -> bool {
        self.exports(module_id).contains(&name)
    }

    /// 宿主脚本构建导出对象时使用的名字清单
    pub fn catalog_json(&self) -> String {
        serde_json::json!({
            "material": MATERIAL_COMPONENTS,
            "materialIcons": MATERIAL_ICON_NAMES,
            "lucideIcons": LUCIDE_ICON_NAMES,
        })
        .to_string()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
