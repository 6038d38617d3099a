// This module is only a chapter of the documentation.
//! This module describes the template syntax used for view files.
//!
//! A template is html (or any text) with a few directives, each
//! starting with an @ sign.
//! There are no expressions, loops or conditionals; templates that
//! need logic can be written as rust closures instead.
//!
//! ```text
//! @extend("layout")
//!
//! @section("title")@title@close
//! ```
#![allow(non_snake_case)]

pub mod a_Fields {
    //! A field of the view is written by its name, preceded by an @
    //! sign.
    //!
    //! ```text
    //! <h1>@title</h1>
    //! ```
    //!
    //! The value is written as is, without html escaping.
    //! A field that is not set writes nothing.
    //!
    //! To get a literal @ sign, write it twice, `@@`.
    //! An @ sign that is not followed by a name is also kept as is.
    //!
    //! Any @ sign followed by a name is a field, so e-mail addresses
    //! and css at-rules must use `@@` as well.
    //! `a@b.com` writes the field `b` (usually nothing) followed by
    //! `.com`; write `a@@b.com` instead.
    //!
    //! ```text
    //! <style>
    //!   @@media (max-width: 40em) { nav { display: none; } }
    //! </style>
    //! <p>Mail us at info@@example.com</p>
    //! ```
}

pub mod b_Extend {
    //! A template can declare that it extends another template.
    //!
    //! ```text
    //! @extend("layout")
    //! ```
    //!
    //! When the view is rendered, the output of the extending template
    //! is thrown away, and the output of the extended template is used
    //! instead.
    //! The rest of the extending template is still executed, so that
    //! it can define sections for the extended template to show.
    //!
    //! An extended template may extend another one in turn.
}

pub mod c_Sections {
    //! A section is a named part of the output that another template
    //! can show.
    //!
    //! ```text
    //! @section("sidebar")
    //!   <p>Default sidebar</p>
    //! @close
    //! ```
    //!
    //! The content of a section is written where it is closed, and can
    //! be written again with `@show`.
    //!
    //! ```text
    //! <aside>@show("sidebar")</aside>
    //! ```
    //!
    //! Showing a section that is not defined writes nothing.
    //!
    //! When a section that already has content is closed again, each
    //! `@parent` in the existing content is replaced by the new
    //! content.
    //! Sections are closed in the order the templates execute, which
    //! means a template that extends another runs first.
    //!
    //! Sections can not be nested, and each `@section` must be closed by
    //! an `@close` in the same template.
}

pub mod d_Partials {
    //! Another template can be included by name.
    //!
    //! ```text
    //! @partial("partials/nav")
    //! ```
    //!
    //! The included template sees the same fields and sections.
}

pub mod e_Comments {
    //! A comment is written between `@*` and `*@`, and is not a part
    //! of the output.
    //!
    //! ```text
    //! @* This is a comment *@
    //! ```
}
