//! In-page JavaScript used by the directory program.
//!
//! The extraction query walks the result cards and hands back a JSON
//! string; structured data crosses the page boundary as text so the Rust
//! side owns the decoding. The search query fills the portal's form and
//! submits it.

/// Selector probed to decide whether another results page exists.
pub(crate) const NEXT_LINK: &str = ".linkNext";

/// Anchor clicked to advance to the next results page.
pub(crate) const NEXT_LINK_ANCHOR: &str = ".linkNext a";

/// Control clicked to reveal phone numbers on the results page.
pub(crate) const PHONE_REVEAL: &str = ".picTel";

/// Extracts every listing on the current results page.
///
/// Returns `JSON.stringify` of an array of records: kind, name, siret,
/// site, tels, adresse. Enriched records hide their registration id inside
/// a base64-obscured link attribute; standard records report `-`.
pub(crate) const EXTRACT_LISTINGS: &str = r#"(function () {
  var out = [];
  var cards = document.querySelectorAll('.visitCard');
  for (var i = 0; i < cards.length; i++) {
    var card = cards[i];
    var record = { kind: 'standard', name: '', siret: '-', site: '', tels: [], adresse: '' };

    var title = card.querySelector('h2.titleMain>a>span:nth-of-type(1)');
    if (title) { record.name = title.innerText; }

    var site = card.querySelector('.sitePro a') || card.querySelector('.lvsLink2 a');
    if (site) { record.site = site.innerHTML; }

    var tels = card.querySelectorAll('.contactBlock .hideTel strong span');
    for (var j = 0; j < tels.length; j++) {
      record.tels.push(tels[j].innerHTML.replace('.', '').replace(new RegExp(' ', 'g'), ''));
    }

    var where = card.querySelector('.localisationBlock p');
    if (where) { record.adresse = where.innerText.replace(new RegExp('\n', 'g'), ' '); }

    if (card.querySelector('.textPagespro')) {
      record.kind = 'page_pro';
      var tag = card.querySelector('.idTag_PAGESPRO');
      if (tag) {
        try {
          var link = JSON.parse(tag.getAttribute('data-pjlienbrouille'));
          var match = atob(link.url.replace('#', '')).split(/a_siren=(.*)&/);
          if (match.length > 1) { record.siret = match[1]; }
        } catch (err) {}
      }
    }

    out.push(record);
  }
  return JSON.stringify(out);
})()"#;

/// Fills the portal's search form and submits it.
///
/// `term` goes through JSON quoting so arbitrary text stays a single
/// string literal inside the page.
pub(crate) fn search_form(term: &str, department: u32) -> String {
    let what = serde_json::json!(term).to_string();
    format!(
        r#"(function () {{
  document.querySelector('input[name="quoiqui"]').setAttribute('value', {what});
  document.querySelector('input[name="ou"]').setAttribute('value', '{department}');
  document.querySelector('input[name="portail"]').setAttribute('value', 'PJ');
  document.querySelector('form[name="formClassiqueHaut"]').submit();
  return true;
}})()"#
    )
}
