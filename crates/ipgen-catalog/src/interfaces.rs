//! Bus interface templates shared by the catalog.

use ipgen_core::fanout::{InterfaceTemplate, SignalTemplate, WidthExpr};

fn one() -> WidthExpr {
    WidthExpr::Const(1)
}

/// Address channel (`aw` or `ar`).
fn address_channel(t: InterfaceTemplate, ch: &str, user: bool) -> InterfaceTemplate {
    let t = t
        .signal(SignalTemplate::forward(format!("{ch}valid"), one()))
        .signal(SignalTemplate::reverse(format!("{ch}ready"), one()))
        .signal(SignalTemplate::forward(format!("{ch}addr"), WidthExpr::field("addr_width")))
        .signal(SignalTemplate::forward(format!("{ch}burst"), WidthExpr::Const(2)))
        .signal(SignalTemplate::forward(format!("{ch}len"), WidthExpr::Const(8)))
        .signal(SignalTemplate::forward(format!("{ch}size"), WidthExpr::Const(3)))
        .signal(SignalTemplate::forward(format!("{ch}lock"), one()))
        .signal(SignalTemplate::forward(format!("{ch}prot"), WidthExpr::Const(3)))
        .signal(SignalTemplate::forward(format!("{ch}cache"), WidthExpr::Const(4)))
        .signal(SignalTemplate::forward(format!("{ch}qos"), WidthExpr::Const(4)))
        .signal(SignalTemplate::forward(format!("{ch}id"), WidthExpr::field("id_width")));
    if user {
        t.signal(SignalTemplate::forward(format!("{ch}user"), WidthExpr::field("user_width")))
    } else {
        t
    }
}

/// Full AXI4 memory-mapped interface sized by `addr_width`, `data_width` and
/// `id_width`. With `user`, every channel also carries a `user_width` sideband.
pub fn axi4(user: bool) -> InterfaceTemplate {
    let user_signal = |t: InterfaceTemplate, s: SignalTemplate| if user { t.signal(s) } else { t };

    let t = address_channel(InterfaceTemplate::new("axi4"), "aw", user);

    let t = t
        .signal(SignalTemplate::forward("wvalid", one()))
        .signal(SignalTemplate::reverse("wready", one()))
        .signal(SignalTemplate::forward("wlast", one()))
        .signal(SignalTemplate::forward("wdata", WidthExpr::field("data_width")))
        .signal(SignalTemplate::forward("wstrb", WidthExpr::keep("data_width")));
    let t = user_signal(t, SignalTemplate::forward("wuser", WidthExpr::field("user_width")));

    let t = t
        .signal(SignalTemplate::reverse("bvalid", one()))
        .signal(SignalTemplate::forward("bready", one()))
        .signal(SignalTemplate::reverse("bresp", WidthExpr::Const(2)))
        .signal(SignalTemplate::reverse("bid", WidthExpr::field("id_width")));
    let t = user_signal(t, SignalTemplate::reverse("buser", WidthExpr::field("user_width")));

    let t = address_channel(t, "ar", user);

    let t = t
        .signal(SignalTemplate::reverse("rvalid", one()))
        .signal(SignalTemplate::forward("rready", one()))
        .signal(SignalTemplate::reverse("rlast", one()))
        .signal(SignalTemplate::reverse("rresp", WidthExpr::Const(2)))
        .signal(SignalTemplate::reverse("rdata", WidthExpr::field("data_width")))
        .signal(SignalTemplate::reverse("rid", WidthExpr::field("id_width")));
    user_signal(t, SignalTemplate::reverse("ruser", WidthExpr::field("user_width")))
}

/// AXI4-Stream. `tlast`, `tid`, `tdest` and `tuser` exist only when their
/// enable flag is set.
pub fn axi_stream() -> InterfaceTemplate {
    InterfaceTemplate::new("axis")
        .signal(SignalTemplate::forward("tvalid", one()))
        .signal(SignalTemplate::reverse("tready", one()))
        .signal(SignalTemplate::forward("tdata", WidthExpr::field("data_width")))
        .signal(SignalTemplate::forward("tkeep", WidthExpr::keep("data_width")))
        .signal(SignalTemplate::forward("tlast", one()).when("last_en"))
        .signal(SignalTemplate::forward("tid", WidthExpr::field("id_width")).when("id_en"))
        .signal(SignalTemplate::forward("tdest", WidthExpr::field("dest_width")).when("dest_en"))
        .signal(SignalTemplate::forward("tuser", WidthExpr::field("user_width")).when("user_en"))
}

/// SPI pads seen from the master: clock, chip select and data in are forward.
pub fn spi() -> InterfaceTemplate {
    let t = InterfaceTemplate::new("spi")
        .signal(SignalTemplate::forward("sclk", one()))
        .signal(SignalTemplate::forward("cs", one()))
        .signal(SignalTemplate::reverse("mode", WidthExpr::Const(2)));
    let t = (0..4).fold(t, |t, i| t.signal(SignalTemplate::forward(format!("sdi{i}"), one())));
    (0..4).fold(t, |t, i| t.signal(SignalTemplate::reverse(format!("sdo{i}"), one())))
}

#[cfg(test)]
mod tests {
    use ipgen_core::fanout::Flow;

    use super::*;

    fn names(t: &InterfaceTemplate) -> Vec<&str> {
        t.signals.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn axi4_channels() {
        let plain = axi4(false);
        let with_user = axi4(true);
        assert_eq!(plain.signals.len(), 11 + 5 + 4 + 11 + 6);
        assert_eq!(with_user.signals.len(), plain.signals.len() + 5);
        assert!(!names(&plain).iter().any(|n| n.ends_with("user")));
        assert!(names(&with_user).contains(&"ruser"));
    }

    #[test]
    fn axi4_flows() {
        let t = axi4(false);
        let flow = |name: &str| t.signals.iter().find(|s| s.name == name).unwrap().flow;
        assert_eq!(flow("awvalid"), Flow::Forward);
        assert_eq!(flow("awready"), Flow::Reverse);
        assert_eq!(flow("bready"), Flow::Forward);
        assert_eq!(flow("rdata"), Flow::Reverse);
        assert_eq!(flow("wstrb"), Flow::Forward);
    }

    #[test]
    fn stream_optional_signals() {
        let t = axi_stream();
        let optional: Vec<&str> = t
            .signals
            .iter()
            .filter(|s| s.present_when.is_some())
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(optional, ["tlast", "tid", "tdest", "tuser"]);
    }

    #[test]
    fn spi_pads() {
        assert_eq!(
            names(&spi()),
            ["sclk", "cs", "mode", "sdi0", "sdi1", "sdi2", "sdi3", "sdo0", "sdo1", "sdo2", "sdo3"]
        );
    }
}
