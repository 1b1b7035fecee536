//! Chooses which members of a source type become fields, and under which name.

use crate::{overrides, MemberCandidate, MemberKind, SourceTypeDescriptor, SynthesisOptions, Visibility};

const ASYNC_SUFFIX: &str = "Async";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Output,
    Input,
}

pub(crate) struct SelectedMember<'a> {
    pub member: &'a MemberCandidate,
    pub name: String,
}

pub(crate) struct MemberSelector<'a> {
    source: &'a SourceTypeDescriptor,
    options: &'a SynthesisOptions,
}

impl<'a> MemberSelector<'a> {
    pub(crate) fn new(source: &'a SourceTypeDescriptor, options: &'a SynthesisOptions) -> Self {
        MemberSelector { source, options }
    }

    pub(crate) fn select(&self, direction: Direction) -> Vec<SelectedMember<'a>> {
        self.source
            .members
            .iter()
            .filter_map(|member| {
                if let Some(reason) = self.exclusion(member, direction) {
                    tracing::debug!(ty = %self.source.name, member = %member.name, "member skipped: {reason}");
                    return None;
                }

                let name = overrides::identity(&member.markers, || self.derived_name(member));
                if name.is_none() {
                    tracing::debug!(ty = %self.source.name, member = %member.name, "member skipped: dropped by its markers");
                }

                name.map(|name| SelectedMember { member, name })
            })
            .collect()
    }

    fn exclusion(&self, member: &MemberCandidate, direction: Direction) -> Option<&'static str> {
        if member.visibility != Visibility::Public {
            return Some("not public");
        }
        if member.declaring_type.as_deref().is_some_and(|ty| ty != self.source.name) {
            return Some("inherited");
        }
        if member.synthetic {
            return Some("synthetic");
        }
        if member.open_generic {
            return Some("open generic parameters");
        }

        match (direction, &member.kind) {
            (Direction::Output, MemberKind::Property { readable: false, .. }) => Some("not readable"),
            (Direction::Output, _) if member.ty.is_no_value() => Some("no return value"),
            (Direction::Input, MemberKind::Method { .. }) => Some("methods are not input fields"),
            (Direction::Input, MemberKind::Property { writable: false, .. }) => Some("not writable"),
            (Direction::Input, _) if member.is_static => Some("static"),
            _ => None,
        }
    }

    fn derived_name(&self, member: &MemberCandidate) -> String {
        let mut name = member.name.as_str();

        if self.options.strip_async_suffix && member.is_method() && member.ty.is_async() {
            name = name
                .strip_suffix(ASYNC_SUFFIX)
                .filter(|stripped| !stripped.is_empty())
                .unwrap_or(name);
        }

        self.options.name_case.apply(name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Marker, NameCase, TypeRef};

    fn names(source: &SourceTypeDescriptor, options: &SynthesisOptions, direction: Direction) -> Vec<String> {
        MemberSelector::new(source, options)
            .select(direction)
            .into_iter()
            .map(|selected| selected.name)
            .collect()
    }

    fn source() -> SourceTypeDescriptor {
        SourceTypeDescriptor::new("User")
            .member(MemberCandidate::property("Id", TypeRef::int()))
            .member(MemberCandidate::property("Password", TypeRef::string()).private())
            .member(MemberCandidate::property("EqualityContract", TypeRef::named("Type")).synthetic())
            .member(MemberCandidate::property("CreatedBy", TypeRef::string()).declared_by("Entity"))
            .member(MemberCandidate::property("Secret", TypeRef::string()).write_only())
            .member(MemberCandidate::property("Computed", TypeRef::string()).read_only())
            .member(MemberCandidate::property("Count", TypeRef::int()).into_static())
            .member(MemberCandidate::method("Touch", TypeRef::unit()))
            .member(MemberCandidate::method("SaveAsync", TypeRef::future_unit()))
            .member(MemberCandidate::method("DeleteAsync", TypeRef::future(TypeRef::unit())))
            .member(MemberCandidate::method("Convert", TypeRef::generic("T")).open_generic())
            .member(MemberCandidate::method("GetFriendsAsync", TypeRef::future(TypeRef::named("User").list())))
            .member(MemberCandidate::method("LoadAsync", TypeRef::string()))
            .member(MemberCandidate::method("Async", TypeRef::future(TypeRef::string())))
            .member(MemberCandidate::method("Internal", TypeRef::string()).marker(Marker::Ignore))
            .member(MemberCandidate::method("Hidden", TypeRef::string()).marker(Marker::Name(None)))
            .member(MemberCandidate::method("Renamed", TypeRef::string()).marker(Marker::name("Explicit_Name")))
    }

    #[test]
    fn output_members() {
        assert_eq!(
            names(&source(), &SynthesisOptions::default(), Direction::Output),
            [
                "id",
                "computed",
                "count",
                "getFriends",
                "loadAsync",
                "async",
                "Explicit_Name"
            ]
        );
    }

    #[test]
    fn input_members() {
        assert_eq!(
            names(&source(), &SynthesisOptions::default(), Direction::Input),
            ["id", "secret"]
        );
    }

    #[test]
    fn suffix_and_case_are_configurable() {
        let options = SynthesisOptions {
            strip_async_suffix: false,
            name_case: NameCase::Preserve,
            ..Default::default()
        };
        let source = SourceTypeDescriptor::new("Query").member(MemberCandidate::method(
            "GetFriendsAsync",
            TypeRef::future(TypeRef::string()),
        ));

        assert_eq!(names(&source, &options, Direction::Output), ["GetFriendsAsync"]);
    }
}
