//! Behavioral properties of the import reorganizer.
//!
//! # Organization
//!
//! - round trip: sources without imports come back unchanged
//! - idempotence: a second run never changes anything
//! - dedup and ordering of symbols and statements
//! - line wrapping at the page width
//! - block boundaries (scattered and inline imports)
//! - rename maps
//! - comments
//! - listing and adding imports

use impfmt_python::{
    add_import_symbol, list_imported_symbols, transform, EngineError, TransformOptions,
};

fn options() -> TransformOptions {
    TransformOptions::default()
}

fn fix(source: &str) -> String {
    transform(source, &options()).unwrap().output
}

fn fix_with(source: &str, options: &TransformOptions) -> String {
    transform(source, options).unwrap().output
}

const SAMPLES: &[&str] = &[
    "import os\nimport sys\n",
    "import sys, os\nfrom b import y, x\nfrom a import *\n",
    "\"\"\"Doc.\"\"\"\n\nfrom z import (c,  # cee\n    b, a)\n\nx = 1\n",
    "def f():\n    import b\n    import a\n    return a, b\n",
    "class K:\n    from m import y as z, x\n\n    def g(self):\n        pass\n",
    "import b\nimport a",
    "from . import x\nfrom .. import y\nfrom .z import w\n",
    "import late  # @last-import\nimport early\n",
];

// ============================================================================
// Round trip
// ============================================================================

mod round_trip {
    use super::*;

    #[test]
    fn sources_without_imports_are_untouched() {
        let sources = [
            "",
            "\n\n",
            "# just a comment",
            "x = 1\n",
            "def f(a, b=2):\n    return a + b\n",
            "class A(B):\n    '''Doc.'''\n\n    x: int = 3\n",
            "if x:\n    pass\nelif y:  # why\n    pass\nelse:\n    pass\n",
            "@decorator(arg)\nasync def run():\n    async with lock:\n        await go()\n",
            "value = {\n    'a': 1,  # one\n}\n",
            "x = 1\r\ny = 2\r\n",
            "text = '''\nimport os\n'''\n",
        ];
        for source in sources {
            let outcome = transform(source, &options()).unwrap();
            assert!(!outcome.changed, "changed: {:?}", source);
            assert_eq!(outcome.output, source);
        }
    }

    #[test]
    fn canonical_imports_are_untouched() {
        let source = "\
from alpha import A1
from zulu import Z1, Z2, Z3
import bravo
import charlie

print(bravo)
";
        let outcome = transform(source, &options()).unwrap();
        assert!(!outcome.changed);
    }
}

// ============================================================================
// Idempotence
// ============================================================================

mod idempotence {
    use super::*;

    #[test]
    fn second_run_is_a_no_op() {
        for source in SAMPLES {
            let first = fix(source);
            let second = transform(&first, &options()).unwrap();
            assert!(!second.changed, "not idempotent for {:?}:\n{}", source, first);
        }
    }

    #[test]
    fn second_run_is_a_no_op_when_wrapping() {
        let narrow = TransformOptions {
            page_width: 30,
            ..options()
        };
        for source in SAMPLES {
            let first = fix_with(source, &narrow);
            let second = transform(&first, &narrow).unwrap();
            assert!(!second.changed, "not idempotent for {:?}:\n{}", source, first);
        }
    }
}

// ============================================================================
// Dedup and ordering
// ============================================================================

mod dedup_and_ordering {
    use super::*;

    #[test]
    fn duplicate_imports_collapse_first_alias_wins() {
        assert_eq!(
            fix("import numpy as np\nimport numpy as numpy2\n"),
            "import numpy as np\n"
        );
        assert_eq!(
            fix("from a import b as c\nfrom a import b\n"),
            "from a import b as c\n"
        );
        assert_eq!(fix("import os, os\n"), "import os\n");
    }

    #[test]
    fn from_imports_come_before_plain_imports() {
        let source = "\
import charlie
from zulu import Z3, Z1
import bravo
from alpha import A1
from zulu import Z2
";
        assert_eq!(
            fix(source),
            "\
from alpha import A1
from zulu import Z1, Z2, Z3
import bravo
import charlie
"
        );
    }

    #[test]
    fn underscore_names_lead() {
        assert_eq!(
            fix("from zeta import b\nfrom _priv import a\nfrom alpha import y, _x\n"),
            "from _priv import a\nfrom alpha import _x, y\nfrom zeta import b\n"
        );
        assert_eq!(
            fix("from __future__ import annotations\nimport os\n"),
            "from __future__ import annotations\nimport os\n"
        );
    }

    #[test]
    fn last_import_marker_sorts_last() {
        assert_eq!(
            fix("from x import late  # @last-import\nimport a\n"),
            "import a\nfrom x import late  # @last-import\n"
        );
    }

    #[test]
    fn star_and_commented_imports_stay_separate() {
        assert_eq!(
            fix("from m import *\nfrom m import b  # note\nfrom m import a\n"),
            "from m import a\nfrom m import b  # note\nfrom m import *\n"
        );
    }

    #[test]
    fn relative_modules_sort_by_name() {
        assert_eq!(
            fix("from .b import x\nfrom . import a\nfrom .. import z\n"),
            "from . import a\nfrom .. import z\nfrom .b import x\n"
        );
    }
}

// ============================================================================
// Line wrapping
// ============================================================================

mod wrapping {
    use super::*;

    fn narrow() -> TransformOptions {
        TransformOptions {
            page_width: 40,
            ..options()
        }
    }

    #[test]
    fn long_from_import_wraps_and_collapses() {
        let names: Vec<String> = (0..10).rev().map(|i| format!("Name{}", i)).collect();
        let source = format!("from package import {}\n", names.join(", "));
        let wrapped = fix_with(&source, &narrow());
        assert_eq!(
            wrapped,
            "\
from package import (Name0, Name1,
    Name2, Name3, Name4, Name5, Name6,
    Name7, Name8, Name9)
"
        );

        let fewer = "from package import (Name0, Name1,\n    Name2)\n";
        assert_eq!(
            fix_with(fewer, &narrow()),
            "from package import Name0, Name1, Name2\n"
        );
    }

    #[test]
    fn nested_block_wraps_past_its_indent() {
        let source = "def f():\n    from package import alpha, beta, gamma, delta\n";
        assert_eq!(
            fix_with(source, &narrow()),
            "def f():\n    from package import (alpha, beta,\n        delta, gamma)\n"
        );
    }

    #[test]
    fn wrapped_statement_keeps_comment() {
        let source = "from package import alpha, beta, gamma, delta  # group\n";
        assert_eq!(
            fix_with(source, &narrow()),
            "from package import (alpha, beta, delta,\n    gamma)  # group\n"
        );
    }
}

// ============================================================================
// Block boundaries
// ============================================================================

mod blocks {
    use super::*;

    #[test]
    fn function_imports_are_not_merged_into_module_block() {
        let source = "\
import os


def f():
    import os
    return os
";
        let outcome = transform(source, &options()).unwrap();
        assert!(!outcome.changed);
    }

    #[test]
    fn each_block_is_sorted_on_its_own() {
        let source = "\
import b
import a

x = 1

import d
import c
";
        assert_eq!(
            fix(source),
            "\
import a
import b

x = 1

import c
import d
"
        );
    }

    #[test]
    fn comment_starts_a_new_block() {
        let source = "import b\nimport a\n# third party\nimport d\nimport c\n";
        assert_eq!(
            fix(source),
            "import a\nimport b\n# third party\nimport c\nimport d\n"
        );
    }

    #[test]
    fn inline_imports_are_left_alone() {
        for source in ["import b; import a\n", "if x: import b, a\n", "x = 1; import b, a\n"] {
            let outcome = transform(source, &options()).unwrap();
            assert!(!outcome.changed, "changed: {:?}", source);
        }
    }

    #[test]
    fn crlf_files_stay_crlf() {
        assert_eq!(
            fix("import b\r\nimport a\r\n\r\nx = 1\r\n"),
            "import a\r\nimport b\r\n\r\nx = 1\r\n"
        );
    }
}

// ============================================================================
// Rename maps
// ============================================================================

mod rename {
    use super::*;

    fn with_map(pairs: &[(&str, &str)]) -> TransformOptions {
        TransformOptions {
            rename_map: pairs.iter().copied().collect(),
            ..options()
        }
    }

    #[test]
    fn renamed_symbol_keeps_alias_and_comment() {
        let source = "from old.pkg import Thing as T  # keep\nimport json\n";
        assert_eq!(
            fix_with(source, &with_map(&[("old.pkg.Thing", "new.pkg.Thing")])),
            "from new.pkg import Thing as T  # keep\nimport json\n"
        );
    }

    #[test]
    fn renamed_symbol_joins_existing_group() {
        let source = "from new.pkg import Other\nfrom old.pkg import Thing\n";
        assert_eq!(
            fix_with(source, &with_map(&[("old.pkg", "new.pkg")])),
            "from new.pkg import Other, Thing\n"
        );
    }

    #[test]
    fn prefix_rename_applies_to_plain_imports() {
        assert_eq!(
            fix_with("import old.util\n", &with_map(&[("old", "new")])),
            "import new.util\n"
        );
    }

    #[test]
    fn inverted_map_renames_back() {
        let options = TransformOptions {
            invert_rename_map: true,
            ..with_map(&[("old.pkg.Thing", "new.pkg.Thing")])
        };
        assert_eq!(
            fix_with("from new.pkg import Thing\n", &options),
            "from old.pkg import Thing\n"
        );
    }
}

// ============================================================================
// Comments
// ============================================================================

mod comments {
    use super::*;

    #[test]
    fn parenthesized_comments_attach_to_symbols() {
        let source = "\
from m import (
    a,  # about a
    b,
)
";
        assert_eq!(fix(source), "from m import b\nfrom m import a  # about a\n");
    }

    #[test]
    fn statement_comment_applies_to_every_name() {
        assert_eq!(
            fix("from m import b, a  # shared\n"),
            "from m import a, b  # shared\n"
        );
    }

    #[test]
    fn leading_comments_stay_in_place() {
        let source = "#!/usr/bin/env python\n# header\nimport b\nimport a\n";
        assert_eq!(
            fix(source),
            "#!/usr/bin/env python\n# header\nimport a\nimport b\n"
        );
    }

    #[test]
    fn trailing_comment_at_eof_survives() {
        assert_eq!(fix("import b\nimport a  # last"), "import a  # last\nimport b");
    }
}

// ============================================================================
// Listing and adding
// ============================================================================

mod list_and_add {
    use super::*;

    #[test]
    fn list_reports_every_import_in_order() {
        let source = "\
import os
from a import (b,
    c)
def f():
    import sys; x = 1
";
        let listed: Vec<(String, u32)> = list_imported_symbols(source)
            .unwrap()
            .into_iter()
            .map(|s| (s.name, s.line))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("os".to_string(), 1),
                ("a.b".to_string(), 2),
                ("a.c".to_string(), 3),
                ("sys".to_string(), 5),
            ]
        );
    }

    #[test]
    fn add_respects_shebang_and_docstring() {
        let source = "#!/usr/bin/env python\n\"\"\"Module doc.\"\"\"\n\nimport sys\n\nprint(sys.argv)\n";
        let outcome = add_import_symbol(source, "os", &options()).unwrap();
        assert!(outcome.changed);
        assert_eq!(
            outcome.output,
            "#!/usr/bin/env python\n\"\"\"Module doc.\"\"\"\n\nimport os\nimport sys\n\nprint(sys.argv)\n"
        );
    }

    #[test]
    fn add_after_docstring_without_imports() {
        let source = "\"\"\"Module doc.\"\"\"\n\nx = 1\n";
        assert_eq!(
            add_import_symbol(source, "os.path.join", &options()).unwrap().output,
            "\"\"\"Module doc.\"\"\"\n\nfrom os.path import join\n\nx = 1\n"
        );
    }

    #[test]
    fn add_is_a_no_op_for_present_names() {
        for (source, name) in [
            ("import os\n", "os"),
            ("from os import path\n", "os.path"),
            ("import numpy as np\n\nx = 1\n", "numpy"),
        ] {
            let outcome = add_import_symbol(source, name, &options()).unwrap();
            assert!(!outcome.changed, "{} added to {:?}", name, source);
            assert_eq!(outcome.output, source);
        }
    }

    #[test]
    fn add_ignores_function_level_imports() {
        let source = "def f():\n    import os\n";
        assert_eq!(
            add_import_symbol(source, "os", &options()).unwrap().output,
            "import os\n\ndef f():\n    import os\n"
        );
    }

    #[test]
    fn add_twice_adds_once() {
        let once = add_import_symbol("", "json", &options()).unwrap().output;
        assert_eq!(once, "import json\n");
        let twice = add_import_symbol(&once, "json", &options()).unwrap();
        assert!(!twice.changed);
    }
}

// ============================================================================
// Errors
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn invalid_syntax_is_a_parse_error() {
        let err = transform("def (:\n", &options()).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn unterminated_bracket_is_a_parse_error() {
        let err = transform("from a import (b,\n", &options()).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn block_header_needs_a_suite() {
        for source in ["if x:\nimport b\nimport a\n", "def f():\nimport b\n", "with a:\n"] {
            let err = transform(source, &options()).unwrap_err();
            assert!(matches!(err, EngineError::Parse(_)), "{:?}", source);
        }
    }

    #[test]
    fn malformed_statements_are_parse_errors() {
        for source in [
            "x y z\nimport b\nimport a\n",
            "print 'hi'\nimport b\n",
            "x = = 1\n",
            "return = 3\n",
            "1 +\n",
            "import b\nimport a\nx = 1:\n",
            "import b\nimport a\nf(a b)\n",
        ] {
            let err = transform(source, &options()).unwrap_err();
            assert!(matches!(err, EngineError::Parse(_)), "{:?}", source);
        }
    }

    #[test]
    fn statement_errors_fail_listing_too() {
        let source = "import b\nimport a\nprint 'hi'\n";
        let err = list_imported_symbols(source).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn oversized_input_is_refused_before_parsing() {
        let options = TransformOptions {
            max_file_size: 8,
            ..options()
        };
        let err = transform("def (:\n\n\n", &options).unwrap_err();
        assert!(matches!(err, EngineError::FileTooBig { .. }));
    }
}
