//! 宿主脚本
//!
//! 每次渲染都会在全新的 QuickJS 上下文里求值这段脚本。它是一个函数表达式，
//! 调用后返回宿主对象：
//!
//! - `React` / `ReactDOM`：精简的元素与 hooks 运行时、挂载入口
//! - `createRegistry(React, ReactDOM)`：构建模块注册表，沙箱前导代码会调用它
//! - `console` 与定时器占位实现
//! - `execute(source)`：编译并调用沙箱函数，返回 `{ ok, bindings | error }`
//! - `sourceOf(fn)`：函数源码
//! - `mount(component)`：在主题容器中渲染组件，返回 `{ ok, json | error }`
//!
//! 不写任何全局变量，用户代码拿到的一切都来自显式传入的参数。

/// 宿主脚本参数：(nativeLog, paletteJson, catalogJson, maxPasses)
pub const HOST_PRELUDE: &str = r#"
(function (nativeLog, paletteJson, catalogJson, maxPasses) {
    'use strict';

    var palette = JSON.parse(paletteJson);
    var catalog = JSON.parse(catalogJson);

    var ELEMENT = 'lp.element';
    var Fragment = { $$fragment: true, displayName: 'Fragment' };

    function describeError(e) {
        if (e && typeof e === 'object' && 'message' in e) {
            var name = e.name && e.name !== 'Error' ? e.name + ': ' : '';
            return name + e.message;
        }
        return String(e);
    }

    function describe(value) {
        if (value === null) return 'null';
        if (Array.isArray(value)) return 'array';
        if (typeof value === 'object') return 'object with keys {' + Object.keys(value).join(', ') + '}';
        return typeof value;
    }

    function assign(target) {
        for (var i = 1; i < arguments.length; i++) {
            var src = arguments[i];
            if (src == null) continue;
            for (var k in src) {
                if (Object.prototype.hasOwnProperty.call(src, k)) target[k] = src[k];
            }
        }
        return target;
    }

    // ---------- 元素 ----------

    function createElement(type, config) {
        var props = {};
        var key = null;
        if (config != null) {
            for (var k in config) {
                if (!Object.prototype.hasOwnProperty.call(config, k)) continue;
                if (k === 'key') key = config[k] == null ? null : String(config[k]);
                else props[k] = config[k];
            }
        }
        var count = arguments.length - 2;
        if (count === 1) props.children = arguments[2];
        else if (count > 1) props.children = Array.prototype.slice.call(arguments, 2);
        if (type && type.defaultProps) {
            for (var d in type.defaultProps) {
                if (props[d] === undefined) props[d] = type.defaultProps[d];
            }
        }
        return { $$typeof: ELEMENT, type: type, key: key, props: props };
    }

    function isValidElement(value) {
        return !!value && typeof value === 'object' && value.$$typeof === ELEMENT;
    }

    function toArray(children) {
        var out = [];
        (function walk(c) {
            if (c === null || c === undefined || typeof c === 'boolean') return;
            if (Array.isArray(c)) { for (var i = 0; i < c.length; i++) walk(c[i]); return; }
            out.push(c);
        })(children);
        return out;
    }

    var Children = {
        toArray: toArray,
        map: function (children, fn) { return toArray(children).map(fn); },
        forEach: function (children, fn) { toArray(children).forEach(fn); },
        count: function (children) { return toArray(children).length; },
        only: function (children) {
            var list = toArray(children);
            if (list.length !== 1 || !isValidElement(list[0])) {
                throw new Error('React.Children.only expected to receive a single React element child.');
            }
            return list[0];
        }
    };

    // ---------- hooks ----------

    var current = null;
    var instances = {};
    var pendingEffects = [];
    var contextStack = [];
    var dirty = false;
    var rendering = false;

    function slot() {
        if (!current) {
            throw new Error('Invalid hook call. Hooks can only be called inside the body of a function component.');
        }
        return current.index++;
    }

    function depsChanged(prev, next) {
        if (!prev || !next) return true;
        if (prev.length !== next.length) return true;
        for (var i = 0; i < prev.length; i++) {
            if (!Object.is(prev[i], next[i])) return true;
        }
        return false;
    }

    function scheduleUpdate() {
        dirty = true;
    }

    function useReducer(reducer, initialArg, init) {
        var hooks = current ? current.hooks : null;
        var i = slot();
        if (!(i in hooks)) {
            var hook = { state: init !== undefined ? init(initialArg) : initialArg };
            hook.dispatch = function (action) {
                var next = hook.reducer(hook.state, action);
                if (!Object.is(next, hook.state)) {
                    hook.state = next;
                    scheduleUpdate();
                }
            };
            hooks[i] = hook;
        }
        hooks[i].reducer = reducer;
        return [hooks[i].state, hooks[i].dispatch];
    }

    function basicStateReducer(state, action) {
        return typeof action === 'function' ? action(state) : action;
    }

    function useState(initial) {
        return useReducer(basicStateReducer, initial, function (value) {
            return typeof value === 'function' ? value() : value;
        });
    }

    function useEffect(effect, deps) {
        var hooks = current ? current.hooks : null;
        var i = slot();
        var prev = hooks[i];
        if (prev && !depsChanged(prev.deps, deps)) return;
        var hook = { deps: deps, cleanup: prev ? prev.cleanup : undefined };
        hooks[i] = hook;
        pendingEffects.push(function () {
            if (typeof hook.cleanup === 'function') hook.cleanup();
            var cleanup = effect();
            hook.cleanup = typeof cleanup === 'function' ? cleanup : undefined;
        });
    }

    function useRef(initial) {
        var hooks = current ? current.hooks : null;
        var i = slot();
        if (!(i in hooks)) hooks[i] = { current: initial };
        return hooks[i];
    }

    function useMemo(factory, deps) {
        var hooks = current ? current.hooks : null;
        var i = slot();
        var prev = hooks[i];
        if (!prev || depsChanged(prev.deps, deps)) {
            hooks[i] = { value: factory(), deps: deps };
        }
        return hooks[i].value;
    }

    function useCallback(fn, deps) {
        return useMemo(function () { return fn; }, deps);
    }

    function createContext(defaultValue) {
        var context = { $$context: true, defaultValue: defaultValue };
        context.Provider = { $$provider: context, displayName: 'Context.Provider' };
        context.Consumer = function (props) { return props.children(readContext(context)); };
        return context;
    }

    function readContext(context) {
        for (var i = contextStack.length - 1; i >= 0; i--) {
            if (contextStack[i].context === context) return contextStack[i].value;
        }
        return context.defaultValue;
    }

    function useContext(context) {
        if (!current) {
            throw new Error('Invalid hook call. Hooks can only be called inside the body of a function component.');
        }
        return readContext(context);
    }

    function memo(component) {
        return component;
    }

    function forwardRef(render) {
        var wrapped = function (props) { return render(props, props.ref === undefined ? null : props.ref); };
        wrapped.displayName = render.displayName || render.name || 'ForwardRef';
        return wrapped;
    }

    function Component(props) {
        this.props = props;
        this.state = {};
    }
    Component.prototype.isReactComponent = {};
    Component.prototype.setState = function (partial) {
        var next = typeof partial === 'function' ? partial(this.state, this.props) : partial;
        this.state = assign({}, this.state, next);
        scheduleUpdate();
    };
    Component.prototype.forceUpdate = function () { scheduleUpdate(); };

    var React = {
        createElement: createElement,
        Fragment: Fragment,
        Component: Component,
        PureComponent: Component,
        useState: useState,
        useReducer: useReducer,
        useEffect: useEffect,
        useLayoutEffect: useEffect,
        useRef: useRef,
        useMemo: useMemo,
        useCallback: useCallback,
        createContext: createContext,
        useContext: useContext,
        memo: memo,
        forwardRef: forwardRef,
        Children: Children,
        isValidElement: isValidElement,
        version: '18.2.0-preview'
    };

    // ---------- 提交树 ----------

    var handlers = [];

    function plain(value, depth) {
        if (value === null || value === undefined) return value;
        var t = typeof value;
        if (t === 'string' || t === 'boolean') return value;
        if (t === 'number') return isFinite(value) ? value : String(value);
        if (t === 'function' || t === 'symbol' || t === 'bigint') return undefined;
        if (isValidElement(value)) return '[element]';
        if (depth > 6) return '[object]';
        if (Array.isArray(value)) return value.map(function (v) { return plain(v, depth + 1); });
        var out = {};
        for (var k in value) {
            if (!Object.prototype.hasOwnProperty.call(value, k)) continue;
            var v = plain(value[k], depth + 1);
            if (v !== undefined) out[k] = v;
        }
        return out;
    }

    function hostNode(tag, props, path) {
        var node = { tag: tag, props: {}, handlers: [], slots: {}, children: [] };
        for (var k in props) {
            if (!Object.prototype.hasOwnProperty.call(props, k)) continue;
            if (k === 'children' || k === 'ref' || k === 'key') continue;
            var v = props[k];
            if (typeof v === 'function') {
                node.handlers.push(k);
                handlers.push(tag + '.' + k);
            } else if (isValidElement(v)) {
                node.slots[k] = renderNode(v, path + '@' + k);
            } else {
                var p = plain(v, 0);
                if (p !== undefined) node.props[k] = p;
            }
        }
        node.children = renderNode(props.children, path + '/' + tag);
        return node;
    }

    function renderNode(node, path) {
        if (node === null || node === undefined || typeof node === 'boolean') return [];
        if (typeof node === 'string' || typeof node === 'number') return [{ text: String(node) }];
        if (Array.isArray(node)) {
            var out = [];
            for (var i = 0; i < node.length; i++) {
                var child = node[i];
                var seg = isValidElement(child) && child.key !== null ? 'k' + child.key : String(i);
                out = out.concat(renderNode(child, path + '.' + seg));
            }
            return out;
        }
        if (!isValidElement(node)) {
            throw new Error('Objects are not valid as a React child (found: ' + describe(node) + ').');
        }

        var type = node.type;
        var props = node.props;

        if (type === Fragment) return renderNode(props.children, path + '/#');
        if (typeof type === 'string') return [hostNode(type, props, path)];
        if (type && type.$$provider) {
            contextStack.push({ context: type.$$provider, value: props.value });
            try {
                return renderNode(props.children, path + '/P');
            } finally {
                contextStack.pop();
            }
        }
        if (typeof type === 'function') {
            var id = path + ':' + (type.displayName || type.name || 'Anonymous');
            var inst = instances[id] || (instances[id] = { hooks: [], index: 0, component: null });
            var prev = current;
            current = inst;
            inst.index = 0;
            var rendered;
            try {
                if (type.prototype && type.prototype.isReactComponent) {
                    if (!inst.component) inst.component = new type(props);
                    inst.component.props = props;
                    rendered = inst.component.render();
                } else {
                    rendered = type(props);
                }
            } finally {
                current = prev;
            }
            if (rendered === undefined) {
                throw new Error((type.displayName || type.name || 'Component') +
                    '(...): Nothing was returned from render. To render nothing, return null.');
            }
            return renderNode(rendered, id);
        }
        throw new Error('Element type is invalid: expected a string (for built-in components) or a function ' +
            '(for composite components) but got: ' + describe(type) + '.');
    }

    function commit(element) {
        if (rendering) throw new Error('Cannot render while another render is in progress.');
        rendering = true;
        instances = {};
        contextStack = [];
        var tree = [];
        var passes = 0;
        try {
            do {
                passes++;
                if (passes > maxPasses) {
                    throw new Error('Too many re-renders. React limits the number of renders to prevent an infinite loop.');
                }
                dirty = false;
                handlers = [];
                pendingEffects = [];
                tree = renderNode(element, 'root');
                var effects = pendingEffects;
                pendingEffects = [];
                for (var i = 0; i < effects.length; i++) effects[i]();
            } while (dirty);
        } finally {
            rendering = false;
        }
        return { tree: tree, handlers: handlers, passes: passes };
    }

    var ReactDOM = {
        render: function (element, container) {
            var result = commit(element);
            if (container && typeof container === 'object') container.tree = result.tree;
            return null;
        },
        createRoot: function (container) {
            return {
                render: function (element) { ReactDOM.render(element, container); },
                unmount: function () { if (container && typeof container === 'object') container.tree = []; }
            };
        },
        createPortal: function (children) { return children; },
        flushSync: function (fn) { return fn(); }
    };

    // ---------- 主题 ----------

    var ThemeContext = createContext(palette);

    function createTheme(options) {
        options = options || {};
        var theme = assign({}, palette, options.palette || {});
        return assign({ palette: theme, spacing: function (n) { return (n || 1) * 8 + 'px'; } }, options, { palette: theme });
    }

    function paletteOf(theme) {
        if (!theme) return palette;
        return theme.palette ? theme.palette : theme;
    }

    function ThemeProvider(props) {
        var theme = paletteOf(props.theme);
        var background = theme.background || palette.background;
        var text = theme.text || palette.text;
        return createElement(ThemeContext.Provider, { value: theme },
            createElement('lp-theme', {
                'data-mode': theme.mode || palette.mode,
                style: { backgroundColor: background['default'], color: text.primary }
            }, props.children));
    }
    ThemeProvider.displayName = 'ThemeProvider';

    function useTheme() {
        return { palette: useContext(ThemeContext) };
    }

    // ---------- 模块 ----------

    function materialModule(R) {
        var module = {};
        catalog.material.forEach(function (name) {
            var wrapper = function (props) { return R.createElement('Mui' + name, props); };
            wrapper.displayName = name;
            module[name] = wrapper;
        });
        module.ThemeProvider = ThemeProvider;
        module.createTheme = createTheme;
        module.useTheme = useTheme;
        module.CssBaseline = function () { return null; };
        module.icons = materialIcons(R);
        return module;
    }

    var FONT_SIZES = { small: 20, medium: 24, large: 35, inherit: '1em' };

    function materialIcon(R, name) {
        var icon = function (props) {
            props = props || {};
            var size = props.size || FONT_SIZES[props.fontSize] || 24;
            var rest = assign({}, props);
            delete rest.size;
            return R.createElement('svg', assign({
                'data-icon': name,
                width: size,
                height: size,
                viewBox: '0 0 24 24',
                fill: props.color || 'currentColor'
            }, rest));
        };
        icon.displayName = name + 'Icon';
        return icon;
    }

    function materialIcons(R) {
        var icons = {};
        catalog.materialIcons.forEach(function (name) { icons[name] = materialIcon(R, name); });
        return icons;
    }

    var LUCIDE_SHAPES = {
        Clock: [['circle', { cx: 12, cy: 12, r: 10 }], ['polyline', { points: '12 6 12 12 16 14' }]],
        Play: [['polygon', { points: '5 3 19 12 5 21 5 3' }]],
        Pause: [['rect', { x: 6, y: 4, width: 4, height: 16 }], ['rect', { x: 14, y: 4, width: 4, height: 16 }]],
        X: [['line', { x1: 18, y1: 6, x2: 6, y2: 18 }], ['line', { x1: 6, y1: 6, x2: 18, y2: 18 }]],
        Plus: [['line', { x1: 12, y1: 5, x2: 12, y2: 19 }], ['line', { x1: 5, y1: 12, x2: 19, y2: 12 }]],
        Save: [
            ['path', { d: 'M19 21H5a2 2 0 0 1-2-2V5a2 2 0 0 1 2-2h11l5 5v11a2 2 0 0 1-2 2z' }],
            ['polyline', { points: '17 21 17 13 7 13 7 21' }],
            ['polyline', { points: '7 3 7 8 15 8' }]
        ]
    };

    function lucideModule(R) {
        var module = {};
        catalog.lucideIcons.forEach(function (name) {
            var shapes = LUCIDE_SHAPES[name] || [];
            var icon = function (props) {
                props = props || {};
                var size = props.size || 24;
                var children = shapes.map(function (shape, i) {
                    return R.createElement(shape[0], assign({ key: i + 1 }, shape[1]));
                });
                var rest = assign({}, props);
                delete rest.size;
                delete rest.color;
                return R.createElement('svg', assign({
                    xmlns: 'http://www.w3.org/2000/svg',
                    width: size,
                    height: size,
                    viewBox: '0 0 24 24',
                    fill: 'none',
                    stroke: props.color || 'currentColor',
                    strokeWidth: 2,
                    strokeLinecap: 'round',
                    strokeLinejoin: 'round'
                }, rest), children);
            };
            icon.displayName = name;
            module[name] = icon;
        });
        return module;
    }

    function createRegistry(R, D) {
        var material = materialModule(R);
        var modules = {
            'react': R,
            'react-dom': D,
            'react-dom/client': D,
            '@mui/material': material,
            '@mui/material/styles': {
                ThemeProvider: material.ThemeProvider,
                createTheme: material.createTheme,
                useTheme: material.useTheme
            },
            '@mui/icons-material': material.icons,
            'lucide-react': lucideModule(R)
        };
        catalog.materialIcons.forEach(function (name) {
            modules['@mui/icons-material/' + name] = material.icons[name];
        });
        // 未知模块得到一个没有原型的空导出集，成员全部是 undefined
        return new Proxy(modules, {
            get: function (target, id) {
                return Object.prototype.hasOwnProperty.call(target, id) ? target[id] : Object.create(null);
            }
        });
    }

    // ---------- console / 定时器 ----------

    function format(args) {
        return Array.prototype.map.call(args, function (a) {
            if (typeof a === 'string') return a;
            if (a instanceof Error) return describeError(a);
            try {
                var json = JSON.stringify(a);
                return json === undefined ? String(a) : json;
            } catch (e) {
                return String(a);
            }
        }).join(' ');
    }

    var console = {};
    ['log', 'info', 'warn', 'error', 'debug'].forEach(function (level) {
        console[level] = function () { nativeLog(level, format(arguments)); };
    });

    var timerId = 0;
    function setTimer() { return ++timerId; }
    function clearTimer() {}

    // ---------- 沙箱入口 ----------

    var host = {
        React: React,
        ReactDOM: ReactDOM,
        createRegistry: createRegistry,
        console: console,
        setTimeout: setTimer,
        setInterval: setTimer,
        clearTimeout: clearTimer,
        clearInterval: clearTimer,
        sourceOf: function (fn) { return Function.prototype.toString.call(fn); },

        execute: function (source) {
            try {
                var sandbox = (0, eval)(source);
                var bindings = sandbox(React, ReactDOM, host);
                return { ok: true, bindings: Array.isArray(bindings) ? bindings : [] };
            } catch (e) {
                return { ok: false, error: describeError(e) };
            }
        },

        mount: function (component) {
            try {
                var result = commit(createElement(ThemeProvider, { theme: palette }, createElement(component, null)));
                return { ok: true, json: JSON.stringify(result) };
            } catch (e) {
                return { ok: false, error: describeError(e) };
            }
        }
    };

    return host;
})
"#;
