use crate::util::test_utils::tree_tests;

tree_tests!(
    use parser;

    fn test_assignment() {
        let statement = "x = 10";
        let tree_ok = "
            assignment
              checksum x
              integer 10
        ";
    }

    fn test_program_keeps_single_line_breaks() {
        let program = "a = 1\n\n\n// comment\nb = 2;";
        let tree_ok = "
            root
              assignment
                checksum a
                integer 1
              newline
              assignment
                checksum b
                integer 2
              newline
        ";
    }

    fn test_invocation_params() {
        let statement = r#"foo a b = 2 "s""#;
        let tree_ok = r#"
            invocation
              checksum foo
              checksum a
              assignment
                checksum b
                integer 2
              string "s"
        "#;
    }

    fn test_operations_are_left_associative() {
        let statement = "x = 1 + 2 * 3";
        let tree_ok = "
            assignment
              checksum x
              binary Mul
                binary Add
                  integer 1
                  integer 2
                integer 3
        ";
    }

    fn test_parenthesized_operation() {
        let statement = "x = (1 + 2)";
        let tree_ok = "
            assignment
              checksum x
              paren
                binary Add
                  integer 1
                  integer 2
        ";
    }

    fn test_negative_literal_and_subtraction() {
        let program = "x = -5\ny = a - 1";
        let tree_ok = "
            root
              assignment
                checksum x
                integer -5
              newline
              assignment
                checksum y
                binary Sub
                  checksum a
                  integer 1
        ";
    }

    fn test_compound_assignment() {
        let statement = "x -= 2.5";
        let tree_ok = "
            compound_assignment Sub
              checksum x
              float 2.5
        ";
    }

    fn test_derived_comparison() {
        let statement = "if a <= b { break }";
        let tree_ok = "
            if
              condition
                binary LessEquals
                  checksum a
                  checksum b
              body
                break
        ";
    }

    fn test_equality_forms() {
        let program = "x = (a == 1)\ny = (a = 1)\nz = (a != 1)";
        let tree_ok = "
            root
              assignment
                checksum x
                paren
                  binary Equals
                    checksum a
                    integer 1
              newline
              assignment
                checksum y
                paren
                  binary Equals
                    checksum a
                    integer 1
              newline
              assignment
                checksum z
                paren
                  binary NotEquals
                    checksum a
                    integer 1
        ";
    }

    fn test_struct_detached_from_condition() {
        let statement = "if foo { bar }";
        let tree_ok = "
            if
              condition
                checksum foo
              body
                checksum bar
        ";
    }

    fn test_struct_detached_from_negated_condition() {
        let statement = "if !foo {x = 1}";
        let tree_ok = "
            if
              condition
                not
                  checksum foo
              body
                assignment
                  checksum x
                  integer 1
        ";
    }

    fn test_struct_param_kept_before_body() {
        let statement = "if foo {a = 1} {bar}";
        let tree_ok = "
            if
              condition
                invocation
                  checksum foo
                  struct
                    assignment
                      checksum a
                      integer 1
              body
                checksum bar
        ";
    }

    fn test_else_if_chain() {
        let statement = "
            if a {
              x = 1
            } else if b {
              x = 2
            }
            else {
              x = 3
            }
        ";
        let tree_ok = "
            if
              condition
                checksum a
              body
                newline
                assignment
                  checksum x
                  integer 1
                newline
              condition
                checksum b
              body
                newline
                assignment
                  checksum x
                  integer 2
                newline
              else
                newline
                assignment
                  checksum x
                  integer 3
                newline
        ";
    }

    fn test_script_with_defaults() {
        let statement = "script foo a = 1 {\n  x = a\n}";
        let tree_ok = "
            script
              checksum foo
              defaults
                assignment
                  checksum a
                  integer 1
              body
                newline
                assignment
                  checksum x
                  checksum a
                newline
        ";
    }

    fn test_script_without_defaults() {
        let statement = "script foo { return x = 1 }";
        let tree_ok = "
            script
              checksum foo
              body
                return
                  assignment
                    checksum x
                    integer 1
        ";
    }

    fn test_while_loop() {
        let statement = "while { x += 1; break }";
        let tree_ok = "
            while
              compound_assignment Add
                checksum x
                integer 1
              newline
              break
        ";
    }

    fn test_random() {
        let statement = "random {\n  1 { a }\n  2 { b }\n}";
        let tree_ok = "
            random
              weight
                integer 1
              branch
                checksum a
              weight
                integer 2
              branch
                checksum b
        ";
    }

    fn test_local_references() {
        let statement = "foo <...> x = <y>";
        let tree_ok = "
            invocation
              checksum foo
              all_arguments
              assignment
                checksum x
                local
                  checksum y
        ";
    }

    fn test_tuples() {
        let program = "p = (1.0, -2.5)\nv = (1, 2, 3)";
        let tree_ok = "
            root
              assignment
                checksum p
                pair
                  float 1.0
                  float -2.5
              newline
              assignment
                checksum v
                vector
                  integer 1
                  integer 2
                  integer 3
        ";
    }

    fn test_dotted_access() {
        let statement = "x = a.b";
        let tree_ok = "
            assignment
              checksum x
              binary Dot
                checksum a
                checksum b
        ";
    }

    fn test_array_and_struct_literals() {
        let statement = r#"foo list = [1, 2] opts = {x = 1, y = "a"}"#;
        let tree_ok = r#"
            invocation
              checksum foo
              assignment
                checksum list
                array
                  integer 1
                  comma
                  integer 2
              assignment
                checksum opts
                struct
                  assignment
                    checksum x
                    integer 1
                  comma
                  assignment
                    checksum y
                    string "a"
        "#;
    }

    fn test_raw_hash() {
        let statement = "#DEADBEEF = 1";
        let tree_ok = "
            assignment
              checksum #deadbeef
              integer 1
        ";
    }

    fn test_incomplete_assignment() {
        let program = "x = ";
        let expected_errors = &[
            r#"line 1: unexpected Equals "=" (expected an expression, found end of input at token 2)"#,
        ];
    }

    fn test_lexer_error() {
        let program = "x = \"abc";
        let expected_errors = &["line 1: unterminated string"];
    }
);
