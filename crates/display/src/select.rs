/// What connector selection needs to know about one connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate<C, M> {
    pub connector: C,
    pub connected: bool,
    /// First mode the connector advertises.
    pub first_mode: Option<M>,
}

/// Outcome of walking the connector list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selection<C, M> {
    Chosen { connector: C, mode: M },
    /// The first connected connector advertises no modes.
    NoMode(C),
    NoneConnected,
}

/// Pick the first connected connector, in enumeration order.
pub(crate) fn first_connected<C, M>(
    candidates: impl IntoIterator<Item = Candidate<C, M>>,
) -> Selection<C, M> {
    match candidates.into_iter().find(|c| c.connected) {
        Some(Candidate {
            connector,
            first_mode: Some(mode),
            ..
        }) => Selection::Chosen { connector, mode },
        Some(Candidate { connector, .. }) => Selection::NoMode(connector),
        None => Selection::NoneConnected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(connector: u32, connected: bool, mode: Option<(u16, u16)>) -> Candidate<u32, (u16, u16)> {
        Candidate {
            connector,
            connected,
            first_mode: mode,
        }
    }

    #[test]
    fn picks_first_connected_in_order() {
        let sel = first_connected([
            c(31, false, Some((640, 480))),
            c(32, true, Some((1920, 1080))),
            c(33, true, Some((1280, 720))),
        ]);
        assert_eq!(
            sel,
            Selection::Chosen {
                connector: 32,
                mode: (1920, 1080)
            }
        );
    }

    #[test]
    fn nothing_connected() {
        let sel = first_connected([c(31, false, None), c(32, false, Some((800, 480)))]);
        assert_eq!(sel, Selection::NoneConnected);
    }

    #[test]
    fn empty_connector_list() {
        let sel = first_connected(Vec::<Candidate<u32, (u16, u16)>>::new());
        assert_eq!(sel, Selection::NoneConnected);
    }

    #[test]
    fn connected_without_modes_is_not_skipped() {
        let sel = first_connected([c(40, true, None), c(41, true, Some((1024, 600)))]);
        assert_eq!(sel, Selection::NoMode(40));
    }
}
